//! Customer orders and the provider order queue.
//!
//! Lines in an order payload that name the same meal are merged into one
//! order item: quantities are summed and the last price sent is kept. An
//! order's `items` therefore has one entry per distinct meal.

pub mod cart;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::customer_routes().merge(handlers::provider_routes())
}
