use super::{Action, NotesStore};
use crate::config::NotesConfig;
use crate::models::{Note, NotesState};
use crate::query::BrowserQuery;
use crate::storage::BrowserStorage;
use crate::util::SystemClock;
use leptos::prelude::*;

pub type BrowserNotesStore = NotesStore<BrowserStorage, BrowserQuery, SystemClock>;

/// Notes store shared with components through Leptos context.
///
/// Components read through the tracked accessors and mutate only via [`NotesContext::dispatch`].
#[derive(Clone, Copy)]
pub struct NotesContext {
    store: RwSignal<BrowserNotesStore>,
}

impl NotesContext {
    pub fn new(store: BrowserNotesStore) -> Self {
        Self {
            store: RwSignal::new(store),
        }
    }

    pub fn dispatch(&self, action: Action) {
        self.store.update(|s| s.dispatch(action));
    }

    /// Tracked read of the whole state.
    pub fn with_state<T>(&self, f: impl FnOnce(&NotesState) -> T) -> T {
        self.store.with(|s| f(s.state()))
    }

    pub fn selected_note(&self) -> Memo<Option<Note>> {
        let store = self.store;
        Memo::new(move |_| store.with(|s| s.selected_note().cloned()))
    }

    pub fn visible_notes(&self) -> Memo<Vec<Note>> {
        let store = self.store;
        Memo::new(move |_| store.with(|s| s.visible_notes()))
    }

    pub fn all_tags(&self) -> Memo<Vec<String>> {
        let store = self.store;
        Memo::new(move |_| store.with(|s| s.all_tags()))
    }
}

/// Open the browser-backed store and make it available to descendants.
pub fn provide_notes_context() -> NotesContext {
    let config = NotesConfig::from_env();
    let store = NotesStore::open(BrowserStorage, BrowserQuery, SystemClock, config);
    let ctx = NotesContext::new(store);
    provide_context(ctx);
    ctx
}

pub fn use_notes() -> NotesContext {
    expect_context::<NotesContext>()
}
