use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use homepage_core::{ApiCallback, CallbackId};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

fn log_caller(principal: Option<&PrincipalContext>, action: &'static str) {
    match principal {
        Some(p) => tracing::info!(
            principal = %p.principal_id(),
            roles = p.roles().len(),
            admin = p.is_admin(),
            action,
            "callback change requested"
        ),
        None => tracing::info!(action, "unauthenticated callback change requested"),
    }
}

pub async fn list_callbacks(
    Extension(services): Extension<Arc<AppServices>>,
    Path(application_key): Path<String>,
) -> axum::response::Response {
    match services.registry.list_by_application(&application_key).await {
        Ok(callbacks) => (StatusCode::OK, Json(callbacks)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn upsert_callback(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(application_key): Path<String>,
    body: Result<Json<ApiCallback>, JsonRejection>,
) -> axum::response::Response {
    let Json(callback) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text());
        }
    };

    log_caller(principal.as_ref().map(|Extension(p)| p), "upsert");
    match services.registry.upsert(&application_key, &callback).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn remove_callback(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(public_id): Path<String>,
) -> axum::response::Response {
    let public_id: CallbackId = match public_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid callback id"),
    };

    log_caller(principal.as_ref().map(|Extension(p)| p), "remove");
    match services.registry.remove(public_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
