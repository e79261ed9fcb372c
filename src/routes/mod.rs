use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod cart_item;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/cart-item", cart_item::router())
        .nest("/users", users::router())
}
