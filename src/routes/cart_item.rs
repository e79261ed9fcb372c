use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::cart::{CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    services::cart_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_item_list).post(add_cart_item))
        .route("/{id}", put(update_cart_item).delete(remove_cart_item))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart-item",
    responses(
        (status = 200, description = "Items in the current user's cart", body = ApiResponse<CartItemList>),
        (status = 401, description = "Unknown user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_item_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartItemList>>> {
    let resp = cart_item_service::get_cart_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart-item",
    request_body = CreateCartItemRequest,
    responses(
        (status = 200, description = "Add or merge a cart item", body = ApiResponse<CartItem>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Product unavailable or not enough stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_item_service::create_cart_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/cart-item/{id}",
    params(
        ("id" = i32, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated, or removed when quantity <= 0", body = ApiResponse<CartItem>),
        (status = 400, description = "Quantity exceeds stock"),
        (status = 401, description = "Item missing or not in the caller's cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_item_service::update_cart_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart-item/{id}",
    params(
        ("id" = i32, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Removed cart item", body = ApiResponse<CartItem>),
        (status = 401, description = "Item missing or not in the caller's cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_item_service::delete_cart_item(&state, &user, id).await?;
    Ok(Json(resp))
}
