// # State Store Trait
//
// Defines the interface for persisting the last observed availability token.
//
// ## Purpose
//
// The engine compares every fresh observation with the stored one to decide
// whether something changed. State is keyed by (package_id, region) so
// different regions never share state.
//
// ## Implementations
//
// - File-based: one small text file per key
// - Memory: tests and dry runs

use async_trait::async_trait;

use crate::model::StateKey;

/// Trait for state store implementations
///
/// A single writer is assumed. Concurrent processes pointed at the same
/// store are not supported.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last stored token for a key
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))`: A non-empty token was stored
    /// - `Ok(None)`: Nothing stored, or the stored token is empty
    /// - `Err(Error)`: Storage error
    async fn load(&self, key: &StateKey) -> crate::Result<Option<String>>;

    /// Store a token for a key, fully replacing any previous token
    async fn save(&self, key: &StateKey, token: &str) -> crate::Result<()>;
}
