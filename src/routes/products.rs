use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::{CreateProductRequest, ProductList, ProductWithOwner, UpdateProductRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_permission},
    models::Product,
    response::ApiResponse,
    roles::Action,
    routes::params::{ProductQuery, SkuQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/sku-validation", get(sku_validation))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("sku" = Option<String>, Query, description = "Exact SKU"),
        ("quantity" = Option<i32>, Query, description = "Exact stock quantity"),
        ("price_min" = Option<String>, Query, description = "Minimum price"),
        ("price_max" = Option<String>, Query, description = "Maximum price"),
        ("user_ids" = Option<String>, Query, description = "Comma-separated owner ids"),
        ("created_at_from" = Option<String>, Query, description = "RFC 3339 lower bound"),
        ("created_at_to" = Option<String>, Query, description = "RFC 3339 upper bound"),
        ("sort_by" = Option<String>, Query, description = "created_at | price | name | quantity"),
        ("sort_order" = Option<String>, Query, description = "asc | desc"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    ensure_permission(&user, Action::BrowseCatalog)?;
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/sku-validation",
    params(
        ("sku" = String, Query, description = "SKU to check")
    ),
    responses(
        (status = 200, description = "SKU is available", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "SKU already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn sku_validation(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SkuQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_permission(&user, Action::BrowseCatalog)?;
    let resp = product_service::sku_validation(&state, &query.sku).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductWithOwner>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductWithOwner>>> {
    ensure_permission(&user, Action::BrowseCatalog)?;
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Validation failed or SKU taken"),
        (status = 403, description = "Role may not create products"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 401, description = "Product missing or not owned by caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product soft-deleted", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not the owner and not an admin"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}
