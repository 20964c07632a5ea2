//! Time-related utilities with clock abstraction for testability.
//!
//! All timestamps in Yoriai are Unix milliseconds. They are rendered in JST
//! only for display.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use chrono::{FixedOffset, TimeZone, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp_millis()
    }
}

/// Manually advanced clock for testing staleness and ordering.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a new manual clock starting at the given timestamp
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Move the clock forward by `delta_millis`
    pub fn advance(&self, delta_millis: i64) {
        self.now.fetch_add(delta_millis, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute timestamp
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to JST RFC 3339 format
///
/// Returns `None` when the timestamp is out of chrono's representable range.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> Option<String> {
    let jst_offset = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    jst_offset
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|dt| dt.to_rfc3339())
}

/// Convert Unix timestamp (milliseconds) to a short JST `HH:MM:SS` string
pub fn timestamp_to_jst_clock(timestamp_millis: i64) -> String {
    FixedOffset::east_opt(JST_OFFSET_SECS)
        .and_then(|offset| offset.timestamp_millis_opt(timestamp_millis).single())
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
