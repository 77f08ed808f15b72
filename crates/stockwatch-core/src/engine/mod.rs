//! Poll cycle engine
//!
//! The PollEngine is responsible for:
//! - Asking the InventorySource about every configured SKU
//! - Comparing each answer with the StateStore
//! - Recording every attempt in the AvailabilityLog
//! - Notifying on availability transitions
//! - Persisting the fresh value
//!
//! ## Architecture
//!
//! ```text
//!                       ┌──────────────┐
//!                       │  PollEngine  │
//!                       └──────────────┘
//!                              │
//!     ┌──────────────┬─────────┴────┬─────────────────┐
//!     ▼              ▼              ▼                 ▼
//! ┌──────────┐ ┌────────────┐ ┌─────────────────┐ ┌──────────┐
//! │StateStore│ │ Inventory  │ │ AvailabilityLog │ │ Notifier │
//! │load/save │ │  (check)   │ │    (append)     │ │ (sinks)  │
//! └──────────┘ └────────────┘ └─────────────────┘ └──────────┘
//! ```
//!
//! ## Per-SKU Flow
//!
//! 1. Load the previous availability (unknown if nothing stored)
//! 2. Fetch the current availability; on failure log it as unavailable,
//!    leave state alone and mark the SKU failed
//! 3. Compare: changed only if the previous value is known and differs
//! 4. Append a log record
//! 5. Notify if changed
//! 6. Persist the fetched value

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::PollConfig;
use crate::error::Result;
use crate::log::LogRecord;
use crate::model::{Availability, Sku, StateKey};
use crate::notify::{ErrorThrottle, Notifier, NotifyReport, error_message, status_message};
use crate::roles::RoleMapping;
use crate::traits::{AvailabilityLog, InventorySource, StateStore};

/// What happened to one SKU in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuOutcome {
    /// First observation for this key; state seeded, nothing notified
    Seeded { current: Availability },

    /// Same as the stored value
    Unchanged { current: Availability },

    /// Availability transitioned and a notification was attempted
    Changed {
        previous: Availability,
        current: Availability,
        notification: NotifyReport,
    },

    /// The inventory check failed; state left untouched
    Failed { kind: &'static str, error: String },
}

impl SkuOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SkuOutcome::Failed { .. })
    }
}

/// Outcome for one SKU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuResult {
    pub sku: Sku,
    pub outcome: SkuOutcome,
}

/// Outcome of one cycle over all active SKUs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub results: Vec<SkuResult>,
}

impl CycleReport {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
    }

    /// Package ids whose check failed
    pub fn failed_packages(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_success())
            .map(|r| r.sku.package_id.clone())
            .collect()
    }

    /// Number of availability transitions seen
    pub fn changes(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, SkuOutcome::Changed { .. }))
            .count()
    }

    /// Outcome for a package, if it was polled
    pub fn outcome_for(&self, package_id: &str) -> Option<&SkuOutcome> {
        self.results
            .iter()
            .find(|r| r.sku.package_id == package_id)
            .map(|r| &r.outcome)
    }
}

/// Why [`PollEngine::run`] returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Single-cycle mode, every SKU checked successfully
    Completed { cycles: u64 },

    /// A cycle had failed SKUs, so polling stopped after it
    CycleFailed { cycles: u64, failed: Vec<String> },
}

/// Core poll engine
///
/// ## Lifecycle
///
/// 1. Create with [`PollEngine::new()`] and the optional `with_*` setters
/// 2. Start with [`PollEngine::run()`]
/// 3. Returns after one cycle, or keeps cycling in daemon mode until a
///    cycle has a failed SKU
///
/// ## Threading
///
/// Everything runs sequentially on the calling task. SKUs are never polled
/// in parallel.
pub struct PollEngine {
    /// Remote inventory
    source: Box<dyn InventorySource>,

    /// Last-known availability
    state_store: Box<dyn StateStore>,

    /// Availability history (disabled when `None`)
    log: Option<Box<dyn AvailabilityLog>>,

    /// Notification fan-out
    notifier: Notifier,

    /// Mentions for "available" messages
    roles: RoleMapping,

    /// Wall clock for log timestamps and throttling
    clock: Arc<dyn Clock>,

    /// Repeated error notification suppression
    throttle: ErrorThrottle,

    /// SKUs polled each cycle
    skus: Vec<Sku>,

    config: PollConfig,
}

impl PollEngine {
    /// Create a new poll engine
    ///
    /// # Parameters
    ///
    /// - `source`: Inventory source implementation
    /// - `state_store`: State store implementation
    /// - `notifier`: Notification sinks (may be empty)
    /// - `config`: Poll configuration, validated here
    pub fn new(
        source: Box<dyn InventorySource>,
        state_store: Box<dyn StateStore>,
        notifier: Notifier,
        config: PollConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            source,
            state_store,
            log: None,
            notifier,
            roles: RoleMapping::default(),
            clock: Arc::new(SystemClock),
            throttle: ErrorThrottle::new(config.error_notify_window_secs),
            skus: config.active_skus(),
            config,
        })
    }

    /// Record every attempt to an availability log
    pub fn with_log(mut self, log: Box<dyn AvailabilityLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Mention roles in "available" notifications
    pub fn with_roles(mut self, roles: RoleMapping) -> Self {
        self.roles = roles;
        self
    }

    /// Use a specific clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// SKUs polled each cycle
    pub fn skus(&self) -> &[Sku] {
        &self.skus
    }

    /// Prepare the log target before any polling
    ///
    /// An unwritable log location fails here rather than silently losing
    /// history later.
    pub async fn initialize(&self) -> Result<()> {
        info!(
            "Polling {} SKU(s) in region {} via {}",
            self.skus.len(),
            self.config.region,
            self.source.source_name()
        );

        match self.log {
            Some(ref log) => log.ensure_initialized(&self.config.region).await?,
            None => info!("Availability logging disabled"),
        }

        if self.notifier.sink_count() == 0 {
            warn!("No notification sinks configured; changes will only be logged");
        }

        let package_ids: Vec<&str> = self.skus.iter().map(|s| s.package_id.as_str()).collect();
        self.roles.check_coverage(&package_ids);

        Ok(())
    }

    /// Run cycles until done
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome::Completed)`: Single-cycle mode and every SKU succeeded
    /// - `Ok(RunOutcome::CycleFailed)`: A cycle had failed SKUs
    /// - `Err(Error)`: Fatal error (state store or log directory)
    pub async fn run(&self) -> Result<RunOutcome> {
        self.initialize().await?;

        let mut cycles = 0u64;
        loop {
            let report = self.run_cycle().await?;
            cycles += 1;

            if !report.all_succeeded() {
                let failed = report.failed_packages();
                error!(
                    "Cycle {} had {} failed SKU(s) ({}), stopping",
                    cycles,
                    failed.len(),
                    failed.join(", ")
                );
                return Ok(RunOutcome::CycleFailed { cycles, failed });
            }

            match self.config.daemon_interval() {
                Some(interval) => {
                    debug!("Cycle {} done, sleeping {:?}", cycles, interval);
                    tokio::time::sleep(interval).await;
                }
                None => return Ok(RunOutcome::Completed { cycles }),
            }
        }
    }

    /// Poll every active SKU once
    ///
    /// Per-SKU fetch failures are captured in the report; only state store
    /// and log directory failures return `Err`.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        for sku in &self.skus {
            let outcome = self.process_sku(sku).await?;
            report.results.push(SkuResult {
                sku: sku.clone(),
                outcome,
            });
        }

        info!(
            "Cycle complete: {} checked, {} changed, {} failed",
            report.results.len(),
            report.changes(),
            report.failed_packages().len()
        );

        Ok(report)
    }

    async fn process_sku(&self, sku: &Sku) -> Result<SkuOutcome> {
        let region = &self.config.region;
        let key = StateKey::new(sku.package_id.clone(), region.clone());

        let previous = self.load_previous(&key).await?;
        debug!(
            "Previous value for {}: {}",
            key,
            previous.map(|p| p.token()).unwrap_or("<unknown>")
        );

        let current = match self.source.check(&sku.package_id, region).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!(package_id = %sku.package_id, "Error fetching data for {}: {}", sku, e);
                self.append_log(sku, Availability::Unavailable).await?;
                self.notify_error(sku, &e).await;
                return Ok(SkuOutcome::Failed {
                    kind: e.kind(),
                    error: e.to_string(),
                });
            }
        };

        info!(package_id = %sku.package_id, "{} >> {} result: {}", region, sku, current);

        self.append_log(sku, current).await?;

        let outcome = match previous {
            Some(previous) if previous != current => {
                let message = status_message(
                    sku,
                    &self.config.product,
                    current,
                    self.roles.mention_for(&sku.package_id),
                );
                info!("Availability changed for {}: {} -> {}", sku, previous, current);
                let notification = self.notifier.notify(&message).await;
                SkuOutcome::Changed {
                    previous,
                    current,
                    notification,
                }
            }
            Some(_) => SkuOutcome::Unchanged { current },
            None => SkuOutcome::Seeded { current },
        };

        self.state_store.save(&key, current.token()).await?;

        Ok(outcome)
    }

    async fn load_previous(&self, key: &StateKey) -> Result<Option<Availability>> {
        let Some(token) = self.state_store.load(key).await? else {
            return Ok(None);
        };

        let parsed = Availability::from_token(&token);
        if parsed.is_none() {
            warn!("Unrecognised state token '{}' for {}, treating as unknown", token, key);
        }
        Ok(parsed)
    }

    async fn append_log(&self, sku: &Sku, availability: Availability) -> Result<()> {
        if let Some(ref log) = self.log {
            let record = LogRecord::observed(sku, availability, self.clock.now());
            log.append(&self.config.region, &record).await?;
        }
        Ok(())
    }

    async fn notify_error(&self, sku: &Sku, error: &crate::Error) {
        if !self.config.notify_errors {
            return;
        }

        if !self.throttle.allow(error.kind(), self.clock.now()) {
            return;
        }

        let report = self
            .notifier
            .notify(&error_message(sku, &self.config.product, error))
            .await;
        if !report.all_delivered() {
            warn!("Error notification for {} was not fully delivered", sku);
        }
    }
}
