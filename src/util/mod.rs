use chrono::{Local, TimeZone, Utc};
use std::cell::Cell;

/// Source of "now" in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock (`Date.now()` in the browser via chrono's wasm bindings).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        now_ms()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render an epoch-millisecond timestamp in the local timezone.
pub fn format_timestamp(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let c = ManualClock::new(100);
        assert_eq!(c.now_ms(), 100);
        c.advance(5);
        assert_eq!(c.now_ms(), 105);
        c.set(1);
        assert_eq!(c.now_ms(), 1);
    }

    #[test]
    fn test_format_timestamp_shape() {
        let s = format_timestamp(1_700_000_000_000);
        // Timezone-dependent, so only the layout is checked.
        assert_eq!(s.len(), "2023-11-14 22:13".len());
        assert!(s.starts_with("2023-11-1"));
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
