use std::cell::{Cell, RefCell};
use url::form_urlencoded;

/// Query-string access for the current page URL.
pub trait QueryParams {
    fn get(&self, name: &str) -> Option<String>;

    /// Set (`Some`) or drop (`None`) a parameter without adding a history entry.
    fn replace(&self, name: &str, value: Option<&str>);
}

fn pairs(search: &str) -> form_urlencoded::Parse<'_> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
}

/// Read `name` from a raw query string (`?a=1&b=2` or `a=1&b=2`).
pub fn get_query_param(search: &str, name: &str) -> Option<String> {
    pairs(search).find_map(|(k, v)| (k == name).then(|| v.into_owned()))
}

/// Rebuild a query string with `name` set to `value`, or removed when `None`.
///
/// Other parameters keep their order; a set parameter goes last when it was absent.
/// Returns an empty string (no `?`) when nothing is left.
pub fn with_query_param(search: &str, name: &str, value: Option<&str>) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    let mut placed = false;
    let mut empty = true;

    for (k, v) in pairs(search) {
        if k != name {
            out.append_pair(&k, &v);
            empty = false;
            continue;
        }
        if let (Some(next), false) = (value, placed) {
            out.append_pair(name, next);
            placed = true;
            empty = false;
        }
    }
    if let (Some(next), false) = (value, placed) {
        out.append_pair(name, next);
        empty = false;
    }

    if empty {
        return String::new();
    }
    format!("?{}", out.finish())
}

/// The browser address bar, written through `history.replaceState`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserQuery;

impl QueryParams for BrowserQuery {
    fn get(&self, name: &str) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        get_query_param(&search, name)
    }

    fn replace(&self, name: &str, value: Option<&str>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let (Ok(path), Ok(search)) = (location.pathname(), location.search()) else {
            return;
        };
        let hash = location.hash().unwrap_or_default();
        let next = format!("{path}{}{hash}", with_query_param(&search, name, value));
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&next));
        }
    }
}

/// Query string held in memory. Counts writes so callers can check they happen only on change.
#[derive(Debug, Default)]
pub struct MemoryQuery {
    search: RefCell<String>,
    writes: Cell<usize>,
}

impl MemoryQuery {
    pub fn new(search: &str) -> Self {
        Self {
            search: RefCell::new(search.to_string()),
            writes: Cell::new(0),
        }
    }

    pub fn search(&self) -> String {
        self.search.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl QueryParams for MemoryQuery {
    fn get(&self, name: &str) -> Option<String> {
        get_query_param(&self.search.borrow(), name)
    }

    fn replace(&self, name: &str, value: Option<&str>) {
        let next = with_query_param(&self.search.borrow(), name, value);
        *self.search.borrow_mut() = next;
        self.writes.set(self.writes.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_query_param() {
        assert_eq!(get_query_param("?note=abc&x=1", "note").as_deref(), Some("abc"));
        assert_eq!(get_query_param("x=1&note=a%20b", "note").as_deref(), Some("a b"));
        assert_eq!(get_query_param("?note=a+b", "note").as_deref(), Some("a b"));
        assert_eq!(get_query_param("?flag", "flag").as_deref(), Some(""));
        assert!(get_query_param("", "note").is_none());
        assert!(get_query_param("?notes=1", "note").is_none());
    }

    #[test]
    fn test_with_query_param_sets_and_preserves_others() {
        assert_eq!(with_query_param("", "note", Some("n1")), "?note=n1");
        assert_eq!(
            with_query_param("?theme=dark", "note", Some("n1")),
            "?theme=dark&note=n1"
        );
        assert_eq!(
            with_query_param("?note=old&theme=dark", "note", Some("new")),
            "?note=new&theme=dark"
        );
    }

    #[test]
    fn test_with_query_param_removes() {
        assert_eq!(with_query_param("?note=n1", "note", None), "");
        assert_eq!(
            with_query_param("?note=n1&theme=dark&note=n2", "note", None),
            "?theme=dark"
        );
    }

    #[test]
    fn test_with_query_param_encodes_value() {
        let s = with_query_param("", "note", Some("a b&c"));
        assert_eq!(s, "?note=a+b%26c");
        assert_eq!(get_query_param(&s, "note").as_deref(), Some("a b&c"));
    }

    #[test]
    fn test_memory_query_tracks_writes() {
        let q = MemoryQuery::new("?note=x");
        assert_eq!(q.get("note").as_deref(), Some("x"));
        q.replace("note", None);
        assert_eq!(q.search(), "");
        assert_eq!(q.writes(), 1);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_query_replace_roundtrip() {
        let q = BrowserQuery;
        q.replace("note", Some("n-42"));
        assert_eq!(q.get("note").as_deref(), Some("n-42"));
        q.replace("note", None);
        assert!(q.get("note").is_none());
    }
}
