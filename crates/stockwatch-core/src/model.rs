//! Domain types shared by every component
//!
//! - [`Sku`]: one product variant being watched
//! - [`Region`]: two-letter country code scoping queries and state
//! - [`Availability`]: the observed stock signal and its persisted token form
//! - [`StateKey`]: the (package, region) pair state is stored under

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Observed availability of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    /// In stock
    Available,
    /// Out of stock (or could not be determined)
    Unavailable,
}

impl Availability {
    /// Token written to state files and CSV rows
    pub fn token(self) -> &'static str {
        match self {
            Availability::Available => "True",
            Availability::Unavailable => "False",
        }
    }

    /// Parse a persisted token
    ///
    /// Returns `None` for an empty or unrecognised token; both mean the
    /// previous state is unknown.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "True" => Some(Availability::Available),
            "False" => Some(Availability::Unavailable),
            _ => None,
        }
    }

    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Two-letter country code, always upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::config(format!(
                "Region must be a two-letter country code, got '{}'",
                code
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A watched product variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// Storage label shown in messages and logs (e.g. "512")
    pub display_size: String,

    /// Remote lookup key, also names the local state file
    pub package_id: String,

    /// Premium (OLED) display variant
    #[serde(default)]
    pub premium_display: bool,
}

impl Sku {
    pub fn new(
        display_size: impl Into<String>,
        package_id: impl Into<String>,
        premium_display: bool,
    ) -> Self {
        Self {
            display_size: display_size.into(),
            package_id: package_id.into(),
            premium_display,
        }
    }

    /// "OLED" for premium displays, "LCD" otherwise
    pub fn display_type(&self) -> &'static str {
        if self.premium_display { "OLED" } else { "LCD" }
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}GB {} ({})",
            self.display_size,
            self.display_type(),
            self.package_id
        )
    }
}

/// Key that availability state is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub package_id: String,
    pub region: Region,
}

impl StateKey {
    pub fn new(package_id: impl Into<String>, region: Region) -> Self {
        Self {
            package_id: package_id.into(),
            region,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.package_id, self.region)
    }
}
