//! Core traits for stockwatch
//!
//! This module defines the abstract interfaces the engine is wired from.
//!
//! - [`InventorySource`]: Ask the remote inventory whether a package is in stock
//! - [`StateStore`]: Last-known availability per (package, region)
//! - [`AvailabilityLog`]: Append-only availability history
//! - [`NotificationSink`]: One notification delivery target

pub mod availability_log;
pub mod inventory;
pub mod notification_sink;
pub mod state_store;

pub use availability_log::AvailabilityLog;
pub use inventory::InventorySource;
pub use notification_sink::NotificationSink;
pub use state_store::StateStore;
