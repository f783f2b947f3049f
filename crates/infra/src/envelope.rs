//! Response envelope (boundary convention, not engine logic).
//!
//! Every outward result is `{success, message, data?, errors?}`; status codes
//! follow the mapping in [`EngineError::status`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Envelope {
    /// 200-style success.
    pub fn ok(message: impl Into<String>, data: impl Serialize) -> (u16, Self) {
        Self::success(200, message, data)
    }

    /// 201-style success for freshly created records.
    pub fn created(message: impl Into<String>, data: impl Serialize) -> (u16, Self) {
        Self::success(201, message, data)
    }

    fn success(status: u16, message: impl Into<String>, data: impl Serialize) -> (u16, Self) {
        (
            status,
            Self {
                success: true,
                message: message.into(),
                data: serde_json::to_value(data).ok(),
                errors: None,
            },
        )
    }

    /// Map an engine error to its status code and failure envelope.
    pub fn failure(err: &EngineError) -> (u16, Self) {
        let errors = match err {
            EngineError::Validation(fields) => Some(fields.clone()),
            _ => None,
        };
        (
            err.status(),
            Self {
                success: false,
                message: err.to_string(),
                data: None,
                errors,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymgrid_auth::{DenyReason, Role};

    #[test]
    fn success_envelope_carries_data() {
        let (status, envelope) = Envelope::created("created", serde_json::json!({"id": 1}));
        assert_eq!(status, 201);
        assert!(envelope.success);
        assert!(envelope.data.is_some());
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn denial_maps_to_403_with_reason_message() {
        let err = EngineError::PermissionDenied(DenyReason::RoleNotAllowed(Role::Manager));
        let (status, envelope) = Envelope::failure(&err);
        assert_eq!(status, 403);
        assert!(!envelope.success);
        assert!(envelope.message.contains("manager"));
    }

    #[test]
    fn validation_failure_exposes_field_errors() {
        let err = EngineError::validation("role", "managers may only create trainers or members");
        let (status, envelope) = Envelope::failure(&err);
        assert_eq!(status, 400);
        assert!(envelope.errors.unwrap().contains_key("role"));
    }
}
