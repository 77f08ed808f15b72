//! Error notification throttling
//!
//! During an outage every SKU fails the same way. [`ErrorThrottle`] lets one
//! notification per condition through and suppresses repeats until the
//! window has elapsed.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Default suppression window for repeated error notifications (one hour)
pub const DEFAULT_ERROR_NOTIFY_WINDOW_SECS: u64 = 3600;

/// Tracks when each error condition was last notified
#[derive(Debug)]
pub struct ErrorThrottle {
    window: Duration,
    last_sent: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ErrorThrottle {
    pub fn new(window_secs: u64) -> Self {
        let secs = i64::try_from(window_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        Self {
            window: Duration::seconds(secs),
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether a notification for `condition` may be sent at `now`
    ///
    /// Returns `true` and records `now` when allowed.
    pub fn allow(&self, condition: &str, now: DateTime<Utc>) -> bool {
        let mut guard = match self.last_sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(last) = guard.get(condition)
            && now.signed_duration_since(*last) < self.window
        {
            tracing::debug!(
                "Suppressing error notification for '{}' (last sent {})",
                condition,
                last
            );
            return false;
        }

        guard.insert(condition.to_string(), now);
        true
    }
}

impl Default for ErrorThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_NOTIFY_WINDOW_SECS)
    }
}
