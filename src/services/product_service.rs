use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};
use validator::Validate;

use crate::{
    dto::products::{CreateProductRequest, ProductList, ProductWithOwner, UpdateProductRequest},
    entity::{
        products::{ActiveModel, Column, Entity as Products},
        users::Entity as Users,
    },
    error::{AppError, AppResult, is_unique_violation, write_failed},
    middleware::auth::{AuthUser, ensure_permission},
    models::{Product, ProductOwner},
    response::{ApiResponse, Meta},
    roles::{Action, Role},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::user_service::{find_active_user, role_of},
    state::AppState,
};

const SKU_TAKEN: &str = "A product with this SKU already exists.";

/// True when a non-deleted product other than `except` already uses `sku`.
async fn sku_taken<C: ConnectionTrait>(conn: &C, sku: &str, except: Option<i32>) -> AppResult<bool> {
    let mut finder = Products::find()
        .filter(Column::Sku.eq(sku))
        .filter(Column::DeletedAt.is_null());
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(conn).await?.is_some())
}

pub async fn sku_validation(state: &AppState, sku: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let sku = sku.trim();
    if sku.is_empty() {
        return Err(AppError::bad_request("SKU must not be empty."));
    }
    if sku_taken(&state.orm, sku, None).await? {
        return Err(AppError::bad_request(SKU_TAKEN));
    }
    Ok(ApiResponse::success(
        "SKU is available",
        serde_json::json!({ "sku": sku }),
        Some(Meta::empty()),
    ))
}

/// Looks a product up by id, tombstoned rows included.
pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductWithOwner>> {
    let found = Products::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (product, owner) = found.ok_or_else(|| AppError::not_found("Product not found."))?;
    let data = ProductWithOwner {
        product: Product::from(product),
        user: owner.map(ProductOwner::from),
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let owner_ids = query.owner_ids()?;
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());

    if let Some(name) = query.name.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", name.trim().to_lowercase());
        condition = condition
            .add(Expr::expr(Func::lower(Expr::col((Products, Column::Name)))).like(pattern));
    }

    if let Some(sku) = query.sku.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Sku.eq(sku.clone()));
    }

    if let Some(quantity) = query.quantity {
        condition = condition.add(Column::Quantity.eq(quantity));
    }

    if let Some(price_min) = query.price_min {
        condition = condition.add(Column::Price.gte(price_min));
    }

    if let Some(price_max) = query.price_max {
        condition = condition.add(Column::Price.lte(price_max));
    }

    if !owner_ids.is_empty() {
        condition = condition.add(Column::UserId.is_in(owner_ids));
    }

    if let Some(from) = query.created_at_from {
        condition = condition.add(Column::CreatedAt.gte(from.fixed_offset()));
    }

    if let Some(to) = query.created_at_to {
        condition = condition.add(Column::CreatedAt.lte(to.fixed_offset()));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Quantity => Column::Quantity,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col).order_by_asc(Column::Id),
        SortOrder::Desc => finder.order_by_desc(sort_col).order_by_desc(Column::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, owner)| ProductWithOwner {
            product: Product::from(product),
            user: owner.map(ProductOwner::from),
        })
        .collect();

    let meta = Meta::paginate("/products", page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_permission(user, Action::CreateProduct)?;
    find_active_user(&state.orm, user.user_id).await?;
    payload.validate()?;

    let sku = payload.sku.trim().to_string();
    if sku_taken(&state.orm, &sku, None).await? {
        return Err(AppError::bad_request(SKU_TAKEN));
    }

    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name.trim().to_string()),
        sku: Set(sku),
        quantity: Set(payload.quantity),
        price: Set(payload.price),
        user_id: Set(user.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    };
    let product = active.insert(&state.orm).await.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request(SKU_TAKEN)
        } else {
            write_failed("Error saving product")(err)
        }
    })?;

    tracing::info!(user_id = user.user_id, product_id = product.id, sku = %product.sku, "product created");

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_permission(user, Action::UpdateProduct)?;
    let existing = Products::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::unauthorized("Product not found.")),
    };
    if existing.user_id != user.user_id {
        return Err(AppError::unauthorized(
            "You are not authorized to update this product.",
        ));
    }

    payload.validate()?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(sku) = payload.sku {
        let sku = sku.trim().to_string();
        if sku_taken(&state.orm, &sku, Some(id)).await? {
            return Err(AppError::bad_request(SKU_TAKEN));
        }
        active.sku = Set(sku);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    active.updated_at = Set(Utc::now().into());

    active.update(&state.orm).await.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request(SKU_TAKEN)
        } else {
            write_failed("Error updating product")(err)
        }
    })?;

    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found."))?;

    tracing::info!(user_id = user.user_id, product_id = id, "product updated");

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Action::DeleteProduct)?;
    let existing = Products::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found("Product not found.")),
    };

    // The stored role is authoritative, not the one baked into the token.
    let caller = find_active_user(&state.orm, user.user_id).await?;
    if role_of(&caller)? != Role::Admin && existing.user_id != caller.id {
        return Err(AppError::unauthorized(
            "You are not authorized to delete this product.",
        ));
    }

    let mut active: ActiveModel = existing.into();
    let now = Utc::now();
    active.deleted_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    active
        .update(&state.orm)
        .await
        .map_err(write_failed("Error deleting product"))?;

    tracing::info!(user_id = user.user_id, product_id = id, "product soft-deleted");

    Ok(ApiResponse::success(
        "Product deleted successfully.",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

