// # Availability Log Trait
//
// Append-only history of every poll attempt, one row per SKU per cycle.

use async_trait::async_trait;

use crate::log::LogRecord;
use crate::model::Region;

/// Trait for availability log implementations
#[async_trait]
pub trait AvailabilityLog: Send + Sync {
    /// Create today's target for a region (with its header) if it is missing
    ///
    /// Idempotent; never truncates an existing target. Failure here means the
    /// log location is misconfigured and must reach the caller.
    async fn ensure_initialized(&self, region: &Region) -> crate::Result<()>;

    /// Append one record to today's target for a region
    ///
    /// Only failures to create the log directory are returned. Any other
    /// I/O failure is logged and swallowed.
    async fn append(&self, region: &Region, record: &LogRecord) -> crate::Result<()>;
}
