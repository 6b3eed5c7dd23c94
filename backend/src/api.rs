//! HTTP routes of the store service, nested under `/api/`.

use crate::AppState;

pub mod events;
pub mod health;
pub mod link;
pub mod matches;
pub mod roster;
pub mod users;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .nest("/health", health::router(state.clone()))
        .nest("/events", events::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/link", link::router(state.clone()))
        .nest("/roster", roster::router(state.clone()))
        .nest("/matches", matches::router(state))
}
