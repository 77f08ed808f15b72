//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record what the engine does to them so tests can assert on
//! calls without any network or real notification service.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stockwatch_core::traits::{InventorySource, NotificationSink};
use stockwatch_core::{
    Availability, Clock, CsvAvailabilityLog, Error, MemoryStateStore, Notifier, PollConfig,
    PollEngine, Region, Result, RoleMapping, Sku,
};

/// One scripted inventory answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Available,
    Unavailable,
    Timeout,
    Malformed,
}

impl From<bool> for Answer {
    fn from(available: bool) -> Self {
        if available { Answer::Available } else { Answer::Unavailable }
    }
}

/// Inventory source answering from a per-package script
///
/// When a package's script runs out, `fallback` is returned. Clones share
/// scripts and counters.
#[derive(Clone)]
pub struct ScriptedInventory {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Answer>>>>,
    fallback: Answer,
    calls: Arc<AtomicUsize>,
    seen_regions: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInventory {
    pub fn new(fallback: Answer) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fallback,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_regions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue answers for a package
    pub fn script(&self, package_id: &str, answers: impl IntoIterator<Item = Answer>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(package_id.to_string())
            .or_default()
            .extend(answers);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_regions(&self) -> Vec<String> {
        self.seen_regions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl InventorySource for ScriptedInventory {
    async fn check(&self, package_id: &str, region: &Region) -> Result<Availability> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_regions.lock().unwrap().push(region.to_string());

        let answer = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(package_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(self.fallback);

        match answer {
            Answer::Available => Ok(Availability::Available),
            Answer::Unavailable => Ok(Availability::Unavailable),
            Answer::Timeout => Err(Error::network("operation timed out")),
            Answer::Malformed => Err(Error::parse("missing response.inventory_available")),
        }
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}

/// Sink that records every message
#[derive(Clone)]
pub struct RecordingSink {
    name: &'static str,
    fail: bool,
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fail: false,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A sink that records the attempt and then fails
    pub fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            Err(Error::notify(self.name, "HTTP 503 Service Unavailable"))
        } else {
            Ok(())
        }
    }

    fn sink_name(&self) -> &str {
        self.name
    }
}

/// Clock that only moves when told to
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut guard = self.now.lock().unwrap();
        *guard += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn region() -> Region {
    Region::new("DE").unwrap()
}

pub fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn oled_512() -> Sku {
    Sku::new("512", "1202542", true)
}

pub fn lcd_64() -> Sku {
    Sku::new("64", "903905", false)
}

pub fn config(skus: Vec<Sku>) -> PollConfig {
    PollConfig::new(region()).with_skus(skus)
}

/// Everything a contract test needs to drive and inspect an engine
pub struct Harness {
    pub inventory: ScriptedInventory,
    pub store: MemoryStateStore,
    pub sink: RecordingSink,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(fallback: Answer) -> Self {
        Self {
            inventory: ScriptedInventory::new(fallback),
            store: MemoryStateStore::new(),
            sink: RecordingSink::new("recording"),
            clock: ManualClock::at(morning()),
        }
    }

    /// Build an engine sharing this harness' doubles
    pub fn engine(&self, config: PollConfig, roles: RoleMapping, log_dir: Option<&Path>) -> PollEngine {
        let notifier = Notifier::disabled().with_sink(Box::new(self.sink.clone()));
        let clock: Arc<dyn Clock> = Arc::new(self.clock.clone());

        let engine = PollEngine::new(
            Box::new(self.inventory.clone()),
            Box::new(self.store.clone()),
            notifier,
            config,
        )
        .expect("engine construction succeeds")
        .with_roles(roles)
        .with_clock(clock.clone());

        match log_dir {
            Some(dir) => engine.with_log(Box::new(CsvAvailabilityLog::new(dir, clock))),
            None => engine,
        }
    }
}

/// Data rows (header excluded) of a CSV log file
pub fn data_rows(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}
