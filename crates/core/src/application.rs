//! Application key: the owner scope of callback records.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Key identifying the application that owns a set of callbacks.
///
/// Not unique on its own: one application may register many callbacks.
/// Compared byte-for-byte; no case folding or trimming is applied to a key
/// that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationKey(String);

impl ApplicationKey {
    /// Validate and wrap an application key.
    ///
    /// Blank keys (empty or whitespace only) are rejected.
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("application key must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ApplicationKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApplicationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApplicationKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ApplicationKey> for String {
    fn from(value: ApplicationKey) -> Self {
        value.0
    }
}

impl FromStr for ApplicationKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
