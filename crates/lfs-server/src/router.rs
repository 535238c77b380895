use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handler, locks, objects};

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .route(
            "/:user/:repo/locks",
            post(locks::create_lock).get(locks::list_locks),
        )
        .route("/:user/:repo/locks/verify", post(locks::verify_locks))
        .route("/:user/:repo/locks/:id/unlock", post(locks::unlock))
        .route("/:user/:repo/objects", post(objects::put_object))
        .route(
            "/:user/:repo/objects/:oid",
            get(objects::get_object).delete(objects::delete_object),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
