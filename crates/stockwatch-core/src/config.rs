//! Configuration types for stockwatch
//!
//! This module defines the poll configuration consumed by the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::model::{Region, Sku};
use crate::notify::throttle::DEFAULT_ERROR_NOTIFY_WINDOW_SECS;

/// Default region queried when none is configured
pub const DEFAULT_REGION: &str = "DE";

/// Main poll configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Region queried and used to namespace state
    pub region: Region,

    /// SKUs to watch
    #[serde(default = "default_skus")]
    pub skus: Vec<Sku>,

    /// Restrict polling to a single package id
    #[serde(default)]
    pub only_package: Option<String>,

    /// Seconds to sleep between cycles; zero or negative runs a single cycle
    #[serde(default)]
    pub interval_secs: i64,

    /// Product label used in notification text
    #[serde(default = "default_product")]
    pub product: String,

    /// Send a notification when an inventory check fails
    #[serde(default)]
    pub notify_errors: bool,

    /// Minimum spacing between error notifications for the same condition
    ///
    /// Set to 0 to send every error notification.
    #[serde(default = "default_error_notify_window_secs")]
    pub error_notify_window_secs: u64,
}

impl PollConfig {
    /// Create a configuration with the default SKU list for a region
    pub fn new(region: Region) -> Self {
        Self {
            region,
            skus: default_skus(),
            only_package: None,
            interval_secs: 0,
            product: default_product(),
            notify_errors: false,
            error_notify_window_secs: default_error_notify_window_secs(),
        }
    }

    /// Replace the SKU list
    pub fn with_skus(mut self, skus: Vec<Sku>) -> Self {
        self.skus = skus;
        self
    }

    /// Restrict polling to one package id
    pub fn with_only_package(mut self, package_id: Option<String>) -> Self {
        self.only_package = package_id;
        self
    }

    /// Set the daemon interval (seconds, ≤0 = run once)
    pub fn with_interval_secs(mut self, interval_secs: i64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Set the product label
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    /// Enable or disable error notifications and set their window
    pub fn with_error_notifications(mut self, enabled: bool, window_secs: u64) -> Self {
        self.notify_errors = enabled;
        self.error_notify_window_secs = window_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.skus.is_empty() {
            return Err(crate::Error::config("No SKUs configured"));
        }

        let mut seen = HashSet::new();
        for sku in &self.skus {
            if sku.package_id.is_empty() || !sku.package_id.chars().all(|c| c.is_ascii_digit()) {
                return Err(crate::Error::config(format!(
                    "Package id must be numeric, got '{}'",
                    sku.package_id
                )));
            }
            if sku.display_size.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "Display size for package {} cannot be empty",
                    sku.package_id
                )));
            }
            if !seen.insert(sku.package_id.as_str()) {
                return Err(crate::Error::config(format!(
                    "Package {} is configured more than once",
                    sku.package_id
                )));
            }
        }

        if let Some(ref only) = self.only_package
            && !seen.contains(only.as_str())
        {
            return Err(crate::Error::config(format!(
                "Package {} is not one of the configured SKUs",
                only
            )));
        }

        if self.product.trim().is_empty() {
            return Err(crate::Error::config("Product label cannot be empty"));
        }

        Ok(())
    }

    /// SKUs polled each cycle, honouring the single-package restriction
    pub fn active_skus(&self) -> Vec<Sku> {
        match self.only_package {
            Some(ref only) => self
                .skus
                .iter()
                .filter(|sku| &sku.package_id == only)
                .cloned()
                .collect(),
            None => self.skus.clone(),
        }
    }

    /// Sleep between cycles, or `None` when running once
    pub fn daemon_interval(&self) -> Option<Duration> {
        u64::try_from(self.interval_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// The refurbished Steam Deck models
pub fn default_skus() -> Vec<Sku> {
    vec![
        Sku::new("64", "903905", false),
        Sku::new("256", "903906", false),
        Sku::new("512", "903907", false),
        Sku::new("512", "1202542", true),
        Sku::new("1024", "1202547", true),
    ]
}

fn default_product() -> String {
    "steam deck".to_string()
}

fn default_error_notify_window_secs() -> u64 {
    DEFAULT_ERROR_NOTIFY_WINDOW_SECS
}
