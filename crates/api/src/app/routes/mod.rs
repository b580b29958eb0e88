use axum::{
    Router,
    routing::{delete, get},
};

pub mod callbacks;
pub mod system;

/// Router for the callback endpoints (authenticated outside development).
pub fn router() -> Router {
    Router::new()
        .route(
            "/applications/:application_key/callbacks",
            get(callbacks::list_callbacks).put(callbacks::upsert_callback),
        )
        .route("/callbacks/:public_id", delete(callbacks::remove_callback))
}
