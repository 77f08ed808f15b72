//! Availability history
//!
//! Every poll attempt produces one [`LogRecord`]. [`CsvAvailabilityLog`]
//! writes them to one CSV file per (region, UTC day).

pub mod csv;

pub use csv::{CsvAvailabilityLog, HEADER, log_path};

use chrono::{DateTime, Utc};

use crate::model::{Availability, Sku};

/// One row of availability history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub unix_timestamp: i64,
    pub display_size: String,
    pub display_type: String,
    pub package_id: String,
    pub available: bool,
}

impl LogRecord {
    /// Record an observation of a SKU at a point in time
    pub fn observed(sku: &Sku, availability: Availability, at: DateTime<Utc>) -> Self {
        Self {
            unix_timestamp: at.timestamp(),
            display_size: sku.display_size.clone(),
            display_type: sku.display_type().to_string(),
            package_id: sku.package_id.clone(),
            available: availability.is_available(),
        }
    }

    /// Render as a CSV line (without trailing newline)
    pub fn to_csv_row(&self) -> String {
        [
            self.unix_timestamp.to_string(),
            csv_field(&self.display_size),
            csv_field(&self.display_type),
            csv_field(&self.package_id),
            Availability::from(self.available).token().to_string(),
        ]
        .join(",")
    }
}

/// Quote a field if it contains a delimiter, quote, or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
