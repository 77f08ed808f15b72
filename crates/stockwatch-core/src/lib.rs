// # stockwatch-core
//
// Core library for the stockwatch inventory poller.
//
// ## Architecture Overview
//
// This library provides the pieces of one poll cycle:
// - **InventorySource**: Trait for asking the remote inventory whether a package is in stock
// - **StateStore**: Trait for the last-known availability per (package, region)
// - **AvailabilityLog**: Trait for the append-only, per-day availability history
// - **NotificationSink**: Trait for one delivery target; [`Notifier`] fans out to many
// - **PollEngine**: Drives fetch → compare → log → notify → persist for every SKU
//
// ## Design Principles
//
// 1. **Sequential**: SKUs are polled one at a time, there is no background work
// 2. **Library-First**: The daemon is a thin wrapper; everything here is usable on its own
// 3. **Fail-Fast Loop**: A cycle with any failed SKU ends daemon mode
// 4. **Best-Effort Notifications**: A broken sink never aborts a cycle

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod model;
pub mod notify;
pub mod roles;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use clock::{Clock, SystemClock};
pub use config::{PollConfig, default_skus};
pub use engine::{CycleReport, PollEngine, RunOutcome, SkuOutcome};
pub use error::{Error, Result};
pub use log::{CsvAvailabilityLog, LogRecord};
pub use model::{Availability, Region, Sku, StateKey};
pub use notify::{Notifier, NotifyReport};
pub use roles::RoleMapping;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{AvailabilityLog, InventorySource, NotificationSink, StateStore};
