pub mod config;
pub mod game;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;
pub mod util;

pub use config::NotesConfig;
pub use game::{calculate_winner, Game, GameStatus, Player, Win};
pub use models::{Note, NoteChanges, NoteDraft, NoteId, NotesState, SortMode};
pub use query::{BrowserQuery, MemoryQuery, QueryParams};
pub use state::{
    normalize_tag, provide_notes_context, reduce, use_notes, visible_notes, Action, NotesContext,
    NotesStore,
};
pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage, StorageError};
pub use util::{Clock, ManualClock, SystemClock};

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn start() {
    console_error_panic_hook::set_once();
}
