//! Role mapping: package id → mention token
//!
//! Loaded once at startup from a JSON object such as
//!
//! ```json
//! { "903905": "112233445566778899", "1202542": "998877665544332211" }
//! ```
//!
//! A missing or malformed file is never fatal; it degrades to an empty
//! mapping with a warning.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Mention tokens per package id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMapping {
    roles: HashMap<String, String>,
}

impl RoleMapping {
    pub fn new(roles: HashMap<String, String>) -> Self {
        Self { roles }
    }

    /// Load a mapping file, falling back to an empty mapping on any problem
    pub async fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            warn!("Role mapping file {} not found, mentions disabled", path.display());
            return Self::default();
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read role mapping from {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json_str(&content) {
            Ok(mapping) => {
                info!("Role mapping loaded: {} entries", mapping.len());
                mapping
            }
            Err(e) => {
                warn!("Could not load role mapping from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a JSON object of package id → token
    ///
    /// Tokens may be strings or integers. Entries with any other value type
    /// are skipped with a warning.
    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Object(entries) = value else {
            return Err(crate::Error::config("role mapping must be a JSON object"));
        };

        let mut roles = HashMap::with_capacity(entries.len());
        for (package_id, token) in entries {
            match token {
                Value::String(s) => {
                    roles.insert(package_id, s);
                }
                Value::Number(n) if n.is_u64() || n.is_i64() => {
                    roles.insert(package_id, n.to_string());
                }
                other => {
                    warn!(
                        "Ignoring role mapping entry for {}: expected string, got {}",
                        package_id, other
                    );
                }
            }
        }

        Ok(Self { roles })
    }

    /// Mention token for a package, if any
    pub fn mention_for(&self, package_id: &str) -> Option<&str> {
        self.roles
            .get(package_id)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Warn when the mapping does not line up with the watched SKUs
    pub fn check_coverage(&self, package_ids: &[&str]) {
        if self.is_empty() {
            info!("No role mapping - notifications will not mention roles");
            return;
        }

        if self.len() != package_ids.len() {
            warn!(
                "Role mapping has {} entries for {} SKUs; mentions will not work as expected",
                self.len(),
                package_ids.len()
            );
        }

        for package_id in package_ids {
            if self.mention_for(package_id).is_none() {
                warn!("No role mapped for package {}", package_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_strings_and_integers() {
        let mapping =
            RoleMapping::from_json_str(r#"{"903905": "111", "1202542": 222, "bad": [1]}"#)
                .unwrap();

        assert_eq!(mapping.mention_for("903905"), Some("111"));
        assert_eq!(mapping.mention_for("1202542"), Some("222"));
        assert_eq!(mapping.mention_for("bad"), None);
        assert_eq!(mapping.mention_for("missing"), None);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_empty_token_is_no_mention() {
        let mapping = RoleMapping::from_json_str(r#"{"903905": ""}"#).unwrap();
        assert_eq!(mapping.mention_for("903905"), None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(RoleMapping::from_json_str("[1, 2]").is_err());
        assert!(RoleMapping::from_json_str("{not json").is_err());
    }

    #[tokio::test]
    async fn test_load_degrades_to_empty() {
        let dir = tempdir().unwrap();

        let missing = RoleMapping::load(Some(&dir.path().join("missing.json"))).await;
        assert!(missing.is_empty());

        let malformed_path = dir.path().join("roles.json");
        std::fs::write(&malformed_path, "{\"903905\": ").unwrap();
        let malformed = RoleMapping::load(Some(&malformed_path)).await;
        assert!(malformed.is_empty());

        assert!(RoleMapping::load(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, r#"{"903905": "42"}"#).unwrap();

        let mapping = RoleMapping::load(Some(&path)).await;
        assert_eq!(mapping.mention_for("903905"), Some("42"));
    }
}
