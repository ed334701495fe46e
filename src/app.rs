use crate::handlers;
use crate::state::AppState;
use crate::view::Action;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    let actions = state.actions.clone();
    Router::new()
        .route(actions.route(Action::Search), get(handlers::index))
        .route(actions.route(Action::Create), post(handlers::create_task))
        .route(actions.route(Action::Toggle), post(handlers::toggle_task))
        .route(actions.route(Action::Edit), post(handlers::edit_task))
        .route(actions.route(Action::Delete), post(handlers::delete_task))
        .route(actions.route(Action::ClearAll), post(handlers::clear_tasks))
        .route(actions.route(Action::ClearSearch), get(handlers::clear_search))
        .route("/api/view", get(handlers::get_view))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
