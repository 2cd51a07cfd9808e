use crate::storage::STORAGE_KEY;
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL_PARAM: &str = "note";

/// Where the notes store lives: the storage slot and the URL parameter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NotesConfig {
    pub storage_key: String,
    pub url_param: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            url_param: DEFAULT_URL_PARAM.to_string(),
        }
    }
}

impl NotesConfig {
    /// Defaults, overridden by `window.ENV.NOTES_STORAGE_KEY` / `window.ENV.NOTES_URL_PARAM`
    /// when the page defines them.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(key) = env_string("NOTES_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(param) = env_string("NOTES_URL_PARAM") {
            config.url_param = param;
        }
        config
    }
}

fn env_string(name: &str) -> Option<String> {
    let env = web_sys::window()?.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    js_sys::Reflect::get(&env, &name.into())
        .ok()?
        .as_string()
        .filter(|s| !s.trim().is_empty())
}
