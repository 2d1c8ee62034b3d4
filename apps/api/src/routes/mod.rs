pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::menus::handlers as menu_handlers;
use crate::qa::handlers as qa_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/menus/upload", post(menu_handlers::handle_upload))
        .route("/menus/:menu_id/parse", post(menu_handlers::handle_parse))
        .route("/qa", post(qa_handlers::handle_qa))
        .with_state(state)
}
