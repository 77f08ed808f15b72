// # Inventory Source Trait
//
// Defines the interface for querying the remote inventory service.
//
// ## Implementations
//
// - Steam physical goods API: `stockwatch-inventory-steam` crate
//
// ## Usage
//
// ```rust,ignore
// use stockwatch_core::{InventorySource, Region};
//
// let source = /* InventorySource implementation */;
// let availability = source.check("903905", &Region::new("DE")?).await?;
// ```

use async_trait::async_trait;

use crate::model::{Availability, Region};

/// Trait for inventory source implementations
///
/// # Contract
///
/// - Exactly one request per call; retrying is the engine's business
///   (the next daemon cycle), never the source's
/// - Every request must have a bounded timeout
/// - Transport failures, timeouts and non-success statuses are
///   [`Error::Network`](crate::Error::Network)
/// - A response without the expected availability field is
///   [`Error::Parse`](crate::Error::Parse)
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Check whether a package is currently available in a region
    async fn check(&self, package_id: &str, region: &Region) -> crate::Result<Availability>;

    /// Name used in logs
    fn source_name(&self) -> &str;
}
