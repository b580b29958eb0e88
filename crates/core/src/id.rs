//! Public identifier of a callback record.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Externally issued identifier of a callback record.
///
/// Identifies a record across the whole store, independent of the owning
/// application. The nil UUID is treated as "missing".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(Uuid);

impl CallbackId {
    /// Create a new random identifier.
    ///
    /// Identifiers are normally issued by the registering application; this
    /// is mostly useful in tests.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Reject the nil identifier.
    pub fn ensure_valid(self) -> DomainResult<Self> {
        if self.is_nil() {
            return Err(DomainError::invalid_id("CallbackId: nil identifier"));
        }
        Ok(self)
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for CallbackId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<CallbackId> for Uuid {
    fn from(value: CallbackId) -> Self {
        value.0
    }
}

impl FromStr for CallbackId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("CallbackId: {e}")))?;
        Self(uuid).ensure_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nil_identifier_is_rejected() {
        let err = CallbackId::from_uuid(Uuid::nil()).ensure_valid().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!("00000000-0000-0000-0000-000000000000".parse::<CallbackId>().is_err());
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!("not-a-uuid".parse::<CallbackId>().is_err());
        assert!("".parse::<CallbackId>().is_err());
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let id = CallbackId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    proptest! {
        #[test]
        fn display_then_parse_preserves_identity(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid::from_bytes(bytes);
            prop_assume!(!uuid.is_nil());
            let id = CallbackId::from_uuid(uuid);
            let parsed: CallbackId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }
    }
}
