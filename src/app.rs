use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/stats", get(handlers::stats_page))
        .route("/urges", post(handlers::form_add))
        .route("/urges/:id/tap", post(handlers::form_tap))
        .route("/urges/:id/reset", post(handlers::form_reset))
        .route("/urges/:id/rename", post(handlers::form_rename))
        .route("/urges/:id/delete", post(handlers::form_delete))
        .route("/api/urges", get(handlers::list_urges).post(handlers::create_urge))
        .route(
            "/api/urges/:id",
            get(handlers::get_urge)
                .put(handlers::rename_urge)
                .delete(handlers::delete_urge),
        )
        .route("/api/urges/:id/tap", post(handlers::tap_urge))
        .route("/api/urges/:id/reset", post(handlers::reset_urge))
        .route("/api/urges/:id/stats", get(handlers::urge_stats))
        .route("/api/stats", get(handlers::main_stats))
        .with_state(state)
}
