use axum::{Json, Router, extract::State, routing::post};

use crate::{
    error::AppResult, middleware::auth::AuthUser, models::Cart, response::ApiResponse,
    services::cart_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create_cart))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/create",
    responses(
        (status = 200, description = "Cart created", body = ApiResponse<Cart>),
        (status = 401, description = "Unknown user"),
        (status = 409, description = "User already has a cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::create_cart(&state, &user).await?;
    Ok(Json(resp))
}
