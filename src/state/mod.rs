mod context;
mod filter;

pub use context::{provide_notes_context, use_notes, NotesContext};
pub use filter::{all_tags, display_title, note_meta, visible_notes};

use crate::config::NotesConfig;
use crate::models::{Note, NoteChanges, NoteDraft, NoteId, NotesState, SortMode};
use crate::query::QueryParams;
use crate::storage::{load_state, save_state, KeyValueStore};
use crate::util::Clock;
use leptos::logging::log;

/// Every mutation the notes UI can request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Add(Option<NoteDraft>),
    Update { id: NoteId, changes: NoteChanges },
    Delete(NoteId),
    Select(Option<NoteId>),
    TogglePin(NoteId),
    AddTag { id: NoteId, tag: String },
    RemoveTag { id: NoteId, tag: String },
    SetSearch(String),
    SetTagFilter(Option<String>),
    SetSort(SortMode),
    Hydrate(NotesState),
}

impl Action {
    /// Whether applying this action writes the state back to storage.
    pub fn persists(&self) -> bool {
        !matches!(self, Action::Hydrate(_))
    }
}

/// Lowercase, trimmed, with whitespace runs collapsed to `-`. Empty input stays empty.
pub fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for t in tags {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn new_note_id() -> NoteId {
    uuid::Uuid::new_v4().to_string()
}

/// Apply `f` to the note with `id`, if any. `updatedAt` never moves backwards.
fn map_note(
    notes: &[Note],
    id: &str,
    now_ms: i64,
    bump: bool,
    f: impl FnOnce(&mut Note),
) -> Vec<Note> {
    let mut f = Some(f);
    notes
        .iter()
        .map(|n| {
            let mut n = n.clone();
            if n.id == id {
                if let Some(f) = f.take() {
                    f(&mut n);
                    if bump {
                        n.updated_at = n.updated_at.max(now_ms);
                    }
                }
            }
            n
        })
        .collect()
}

/// State transition. Returns a new state; `state` is left untouched.
pub fn reduce(state: &NotesState, action: Action, now_ms: i64) -> NotesState {
    match action {
        Action::Hydrate(next) => next,
        Action::Add(draft) => {
            let draft = draft.unwrap_or_default();
            let note = Note {
                id: new_note_id(),
                title: draft.title.unwrap_or_default(),
                body: draft.body.unwrap_or_default(),
                tags: dedup_tags(
                    draft
                        .tags
                        .unwrap_or_default()
                        .iter()
                        .map(|t| normalize_tag(t))
                        .filter(|t| !t.is_empty())
                        .collect(),
                ),
                pinned: draft.pinned.unwrap_or(false),
                created_at: now_ms,
                updated_at: now_ms,
            };
            let selected_id = Some(note.id.clone());
            let mut notes = Vec::with_capacity(state.notes.len() + 1);
            notes.push(note);
            notes.extend(state.notes.iter().cloned());
            NotesState {
                notes,
                selected_id,
                ..state.clone()
            }
        }
        Action::Update { id, changes } => NotesState {
            notes: map_note(&state.notes, &id, now_ms, true, |n| {
                if let Some(title) = changes.title {
                    n.title = title;
                }
                if let Some(body) = changes.body {
                    n.body = body;
                }
                if let Some(tags) = changes.tags {
                    n.tags = dedup_tags(tags);
                }
                if let Some(pinned) = changes.pinned {
                    n.pinned = pinned;
                }
            }),
            ..state.clone()
        },
        Action::Delete(id) => NotesState {
            notes: state.notes.iter().filter(|n| n.id != id).cloned().collect(),
            selected_id: state.selected_id.clone().filter(|s| *s != id),
            ..state.clone()
        },
        Action::Select(id) => NotesState {
            selected_id: id,
            ..state.clone()
        },
        Action::TogglePin(id) => NotesState {
            notes: map_note(&state.notes, &id, now_ms, true, |n| n.pinned = !n.pinned),
            ..state.clone()
        },
        Action::AddTag { id, tag } => {
            let tag = normalize_tag(&tag);
            if tag.is_empty() {
                return state.clone();
            }
            NotesState {
                notes: map_note(&state.notes, &id, now_ms, true, |n| {
                    if !n.has_tag(&tag) {
                        n.tags.push(tag);
                    }
                }),
                ..state.clone()
            }
        }
        // Tag removal leaves `updatedAt` alone, unlike every other note mutation.
        Action::RemoveTag { id, tag } => {
            let tag = normalize_tag(&tag);
            NotesState {
                notes: map_note(&state.notes, &id, now_ms, false, |n| {
                    n.tags.retain(|t| *t != tag)
                }),
                ..state.clone()
            }
        }
        Action::SetSearch(search) => NotesState {
            search,
            ..state.clone()
        },
        Action::SetTagFilter(tag_filter) => NotesState {
            tag_filter,
            ..state.clone()
        },
        Action::SetSort(sort) => NotesState {
            sort,
            ..state.clone()
        },
    }
}

/// Notes state bound to its storage slot, URL parameter and clock.
///
/// Lifecycle: [`NotesStore::open`] loads (or defaults) and restores the URL selection,
/// [`NotesStore::dispatch`] mutates, and there is no teardown: the last write is already
/// persisted.
pub struct NotesStore<S, Q, C> {
    state: NotesState,
    storage: S,
    query: Q,
    clock: C,
    config: NotesConfig,
}

impl<S: KeyValueStore, Q: QueryParams, C: Clock> NotesStore<S, Q, C> {
    pub fn open(storage: S, query: Q, clock: C, config: NotesConfig) -> Self {
        let state = load_state(&storage, &config.storage_key);
        log!(
            "[notes] loaded {} note(s) from `{}`",
            state.notes.len(),
            config.storage_key
        );

        let mut store = Self {
            state,
            storage,
            query,
            clock,
            config,
        };

        // First write makes sure the slot exists even if the session never mutates.
        store.persist();

        // Startup selection comes from the URL and is not written back to storage.
        if let Some(id) = store.query.get(&store.config.url_param) {
            if !id.is_empty() {
                store.state = reduce(&store.state, Action::Select(Some(id)), store.clock.now_ms());
            }
        }

        // A selection rehydrated from storage is mirrored into the URL.
        if let Some(selected) = store.state.selected_id.as_deref() {
            if store.query.get(&store.config.url_param).as_deref() != Some(selected) {
                store.query.replace(&store.config.url_param, Some(selected));
            }
        }
        store
    }

    pub fn state(&self) -> &NotesState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    pub fn dispatch(&mut self, action: Action) {
        let persists = action.persists();
        let now = self.clock.now_ms();
        let next = reduce(&self.state, action, now);
        let selection_changed = next.selected_id != self.state.selected_id;
        self.state = next;

        if persists {
            self.persist();
        }
        if selection_changed {
            self.query
                .replace(&self.config.url_param, self.state.selected_id.as_deref());
        }
    }

    /// The list the notes panel shows: filtered by search and tag, sorted, pinned first.
    pub fn visible_notes(&self) -> Vec<Note> {
        visible_notes(
            &self.state.notes,
            &self.state.search,
            self.state.tag_filter.as_deref(),
            self.state.sort,
        )
    }

    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.state.notes)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.state.selected_note()
    }

    fn persist(&self) {
        save_state(&self.storage, &self.config.storage_key, &self.state);
    }
}
