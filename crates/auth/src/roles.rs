use serde::{Deserialize, Serialize};

/// Role granting administrative access to the homepage.
pub const ADMIN_ROLE: &str = "admin";

/// A role claim carried by a bearer token.
///
/// Names are trimmed and lower-cased on construction, so `Admin` from one
/// identity provider and `admin` from another compare equal. The callback
/// routes only require an authenticated caller; roles end up on the request
/// context and in the request log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(name.trim().to_ascii_lowercase())
    }

    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
