use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use homepage_infra::CallbackStore;

use crate::app::dto::{self, AppVersion, HealthEntry, HealthReport, HealthStatus};
use crate::app::services::AppServices;
use crate::config::ApiConfig;

const HSTS: &str = "max-age=31536000; includeSubDomains";

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let started = Instant::now();
    let probe = services.store().ping().await;
    let duration = dto::format_elapsed(started.elapsed());

    let mut data = BTreeMap::new();
    data.insert("backend".to_string(), serde_json::json!(services.store_kind.as_str()));

    let entry = match probe {
        Ok(()) => HealthEntry {
            status: HealthStatus::Healthy,
            description: None,
            duration,
            data,
        },
        Err(e) => {
            tracing::warn!(error = %e, "store health probe failed");
            HealthEntry {
                status: HealthStatus::Unhealthy,
                description: Some(e.to_string()),
                duration,
                data,
            }
        }
    };

    let mut results = BTreeMap::new();
    results.insert("store".to_string(), entry);
    let report = HealthReport::from_entries(results);

    let status = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        [(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS))],
        Json(report),
    )
        .into_response()
}

pub async fn version(Extension(config): Extension<Arc<ApiConfig>>) -> impl IntoResponse {
    Json(AppVersion {
        name: env!("CARGO_PKG_NAME").to_string(),
        current_version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.environment.as_str().to_string(),
        os_version: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        dockerized: config.dockerized,
    })
}
