// # Notification Sink Trait
//
// One delivery target for human-readable messages (chat webhook, push
// service, ...). Sinks are combined by [`Notifier`](crate::notify::Notifier).

use async_trait::async_trait;

/// Trait for notification sink implementations
///
/// A sink makes one delivery attempt per call and reports failure as
/// [`Error::Notify`](crate::Error::Notify). It must not retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a message
    async fn deliver(&self, message: &str) -> crate::Result<()>;

    /// Sink name used in logs and reports
    fn sink_name(&self) -> &str;
}
