use crate::models::{Note, SortMode};
use crate::util::format_timestamp;
use std::collections::BTreeSet;

fn matches(note: &Note, query: &str, tag: Option<&str>) -> bool {
    let query = query.trim().to_lowercase();
    let in_query = query.is_empty()
        || note.title.to_lowercase().contains(&query)
        || note.body.to_lowercase().contains(&query)
        || note.tags.iter().any(|t| t.to_lowercase().contains(&query));

    let in_tag = match tag {
        None => true,
        Some(tag) => {
            let tag = tag.to_lowercase();
            note.tags.iter().any(|t| t.to_lowercase() == tag)
        }
    };

    in_query && in_tag
}

fn sort_notes(notes: &mut [Note], mode: SortMode) {
    match mode {
        SortMode::Title => notes.sort_by_cached_key(|n| n.title.to_lowercase()),
        SortMode::Updated => notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
    // Stable, so the primary order survives within each group.
    notes.sort_by_key(|n| !n.pinned);
}

/// Notes matching `query` and `tag`, ordered by `sort` with pinned notes first.
pub fn visible_notes(notes: &[Note], query: &str, tag: Option<&str>, sort: SortMode) -> Vec<Note> {
    let mut out: Vec<Note> = notes
        .iter()
        .filter(|n| matches(n, query, tag))
        .cloned()
        .collect();
    sort_notes(&mut out, sort);
    out
}

/// Every tag in use, sorted and unique.
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|n| n.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn display_title(note: &Note) -> &str {
    if note.title.trim().is_empty() {
        "Untitled"
    } else {
        &note.title
    }
}

/// Secondary line under a note in the list.
pub fn note_meta(note: &Note) -> String {
    let updated = format!("Updated {}", format_timestamp(note.updated_at));
    if note.pinned {
        format!("📌 Pinned • {updated}")
    } else {
        updated
    }
}
