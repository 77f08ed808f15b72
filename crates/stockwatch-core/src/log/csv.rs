// # Daily CSV Availability Log
//
// One file per (region, UTC calendar day):
//
// ```text
// <log_dir>/availability_DE_2025-03-01.csv
// <log_dir>/availability_DE_2025-03-02.csv
// <log_dir>/availability_US_2025-03-01.csv
// ```
//
// Each file starts with [`HEADER`]. When the day rolls over the next append
// simply lands in a new file; old files are never touched again.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::clock::Clock;
use crate::log::LogRecord;
use crate::model::Region;
use crate::traits::availability_log::AvailabilityLog;

/// Header row of every log file
pub const HEADER: &str = "unix_timestamp,storage_gb,display_type,package_id,available";

/// Log file for a region on a given day
pub fn log_path(base_dir: &Path, region: &Region, date: NaiveDate) -> PathBuf {
    base_dir.join(format!(
        "availability_{}_{}.csv",
        region,
        date.format("%Y-%m-%d")
    ))
}

/// CSV-backed availability log
pub struct CsvAvailabilityLog {
    base_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl CsvAvailabilityLog {
    pub fn new(base_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_dir: base_dir.into(),
            clock,
        }
    }

    /// Today's target for a region
    pub fn current_path(&self, region: &Region) -> PathBuf {
        log_path(&self.base_dir, region, self.clock.now().date_naive())
    }

    async fn ensure_dir(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            Error::log(format!(
                "Failed to create log directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }

    /// Create the file with its header; an existing file is left alone
    async fn write_header_if_missing(path: &Path) -> std::io::Result<()> {
        match OpenOptions::new().write(true).create_new(true).open(path).await {
            Ok(mut file) => {
                file.write_all(format!("{}\n", HEADER).as_bytes()).await?;
                file.flush().await?;
                tracing::info!("Started availability log {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn append_row(path: &Path, row: &str) -> std::io::Result<()> {
        Self::write_header_if_missing(path).await?;

        let mut file = OpenOptions::new().append(true).open(path).await?;
        file.write_all(format!("{}\n", row).as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl AvailabilityLog for CsvAvailabilityLog {
    async fn ensure_initialized(&self, region: &Region) -> Result<(), Error> {
        self.ensure_dir().await?;

        let path = self.current_path(region);
        Self::write_header_if_missing(&path).await.map_err(|e| {
            Error::log(format!(
                "Failed to initialize log file {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn append(&self, region: &Region, record: &LogRecord) -> Result<(), Error> {
        self.ensure_dir().await?;

        let path = self.current_path(region);
        if let Err(e) = Self::append_row(&path, &record.to_csv_row()).await {
            tracing::warn!(
                package_id = %record.package_id,
                "Failed to append to availability log {}: {}",
                path.display(),
                e
            );
        }

        Ok(())
    }
}
