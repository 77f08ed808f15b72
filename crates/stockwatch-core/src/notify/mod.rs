//! Notification fan-out
//!
//! [`Notifier`] delivers one message to every configured
//! [`NotificationSink`]. Each sink is attempted independently; a failure on
//! one never stops the others, and no failure is ever escalated past the
//! returned [`NotifyReport`].

pub mod message;
pub mod throttle;

pub use message::{error_message, status_message};
pub use throttle::ErrorThrottle;

use tracing::{debug, warn};

use crate::traits::NotificationSink;

/// Outcome of one notification across all sinks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Sinks that accepted the message
    pub delivered: Vec<String>,
    /// Sinks that failed, with the error text
    pub failed: Vec<(String, String)>,
}

impl NotifyReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Best-effort delivery to a set of sinks
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl Notifier {
    pub fn new(sinks: Vec<Box<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }

    /// Notifier with no sinks; every notification is a no-op
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver a message to every sink, in order
    pub async fn notify(&self, message: &str) -> NotifyReport {
        let mut report = NotifyReport::default();

        if self.sinks.is_empty() {
            debug!("No notification sinks configured, dropping message: {}", message);
            return report;
        }

        for sink in &self.sinks {
            match sink.deliver(message).await {
                Ok(()) => {
                    debug!("Delivered notification via {}", sink.sink_name());
                    report.delivered.push(sink.sink_name().to_string());
                }
                Err(e) => {
                    warn!("Notification via {} failed: {}", sink.sink_name(), e);
                    report
                        .failed
                        .push((sink.sink_name().to_string(), e.to_string()));
                }
            }
        }

        report
    }
}
