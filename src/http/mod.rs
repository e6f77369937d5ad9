use axum::Router;

use crate::AppState;

mod body;
mod error;
mod handlers;
mod routes;

pub use body::JsonObject;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::users())
        .merge(routes::posts())
        .merge(routes::engagement())
        .merge(routes::social())
        .with_state(state)
}
