use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use homepage_core::DomainError;
use homepage_infra::RegistryError;

pub fn registry_error_to_response(err: RegistryError) -> axum::response::Response {
    match err {
        RegistryError::Validation(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        RegistryError::Validation(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        // Causes are logged by the registry and not echoed to clients.
        RegistryError::Persistence { source, .. } if source.is_connection() => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            "callback store is unavailable",
        ),
        RegistryError::Persistence { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "callback store operation failed",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
