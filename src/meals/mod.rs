mod dto;
pub mod handlers;
mod history;
pub mod repo;
mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
