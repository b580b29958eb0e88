//! External shape of a callback registration.

use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::id::CallbackId;

/// A callback as seen by registering applications and the homepage UI.
///
/// Carries no owner and no store key: the owner comes from the route, and
/// the store key never leaves the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallback {
    pub public_id: CallbackId,
    pub api_type: String,
    pub api_version: String,
    /// Path relative to the application's base address.
    pub relative_callback_uri: String,
}

impl ApiCallback {
    pub fn new(
        public_id: CallbackId,
        api_type: impl Into<String>,
        api_version: impl Into<String>,
        relative_callback_uri: impl Into<String>,
    ) -> Self {
        Self {
            public_id,
            api_type: api_type.into(),
            api_version: api_version.into(),
            relative_callback_uri: relative_callback_uri.into(),
        }
    }

    /// Check the parts of the callback the registry keys on.
    pub fn validate(&self) -> DomainResult<()> {
        self.public_id.ensure_valid().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn json_uses_camel_case() {
        let id = CallbackId::new();
        let cb = ApiCallback::new(id, "card", "1.0.0", "/api/card");
        let json = serde_json::to_value(&cb).unwrap();
        assert_eq!(json["publicId"], id.to_string());
        assert_eq!(json["apiType"], "card");
        assert_eq!(json["apiVersion"], "1.0.0");
        assert_eq!(json["relativeCallbackUri"], "/api/card");
    }

    #[test]
    fn nil_public_id_fails_validation() {
        let cb = ApiCallback::new(CallbackId::from_uuid(Uuid::nil()), "card", "1", "/a");
        assert!(cb.validate().is_err());
    }
}
