use serde::{Deserialize, Serialize};

pub type NoteId = String;

/// A single note as persisted in local storage.
///
/// Field names are camelCase on the wire so the stored blob keeps the layout
/// older sessions wrote.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
    /// Most recently updated first.
    #[default]
    Updated,
    /// Case-insensitive A..Z.
    Title,
}

/// Whole notes store, persisted as one JSON object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotesState {
    pub notes: Vec<Note>,
    pub selected_id: Option<NoteId>,
    pub search: String,
    pub tag_filter: Option<String>,
    pub sort: SortMode,
}

impl NotesState {
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_id.as_deref().and_then(|id| self.note(id))
    }
}

/// Optional overrides for a freshly added note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

/// Partial update merged into an existing note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

impl NoteChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Title and body together, as the editor's save button sends them.
    pub fn content(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }
}
