pub mod client;
mod dto;
pub mod handlers;
pub mod parse;
pub mod rank;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::food_routes()
}
