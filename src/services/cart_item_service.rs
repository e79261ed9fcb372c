//! Cart line items and their consistency with product stock.
//!
//! A line item is either absent or present with a positive quantity. Adding a
//! product that is already in the cart merges into the existing row, and any
//! update to a quantity of zero or less removes the row. Mutations that read
//! stock run inside a transaction holding a row lock on the product, so the
//! stock figure checked is the one in force when the write commits.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use validator::Validate;

use crate::{
    dto::cart::{CartItemDto, CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel, Column, Entity as CartItems, Model as CartItemModel},
        carts::{Entity as Carts, Model as CartModel},
        products::{Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult, write_failed},
    middleware::auth::{AuthUser, ensure_permission},
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
    roles::Action,
    services::{
        cart_service::{ensure_cart, find_cart_for_user},
        user_service::find_active_user,
    },
    state::AppState,
};

/// A cart item together with the cart it was reached through.
pub struct OwnedCartItem {
    pub item: CartItemModel,
    pub cart: CartModel,
}

/// Walks cart item -> cart -> user and only yields the item when the chain ends at `user_id`.
pub async fn load_owned_item<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    cart_item_id: i32,
) -> AppResult<OwnedCartItem> {
    let item = CartItems::find_by_id(cart_item_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::unauthorized("Cart item not found."))?;

    let cart = Carts::find_by_id(item.cart_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::unauthorized("Cart item not found."))?;

    if cart.user_id != user_id {
        tracing::warn!(user_id, cart_item_id, owner_id = cart.user_id, "cart item ownership mismatch");
        return Err(AppError::unauthorized(
            "Cart item does not belong to the user.",
        ));
    }

    Ok(OwnedCartItem { item, cart })
}

async fn lock_product<C: ConnectionTrait>(conn: &C, product_id: i32) -> AppResult<Option<ProductModel>> {
    let product = Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    Ok(product)
}

pub async fn get_cart_items(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartItemList>> {
    ensure_permission(user, Action::ManageCartItems)?;
    find_active_user(&state.orm, user.user_id).await?;

    let Some(cart) = find_cart_for_user(&state.orm, user.user_id).await? else {
        return Ok(ApiResponse::success(
            "OK",
            CartItemList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    };

    let items = CartItems::find()
        .filter(Column::CartId.eq(cart.id))
        .order_by_asc(Column::Id)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|product| CartItemDto {
                id: item.id,
                quantity: item.quantity,
                product: Product::from(product),
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CartItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_cart_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_permission(user, Action::ManageCartItems)?;
    payload.validate()?;
    let CreateCartItemRequest {
        product_id,
        quantity,
    } = payload;

    let txn = state.orm.begin().await?;
    find_active_user(&txn, user.user_id).await?;

    let product = match lock_product(&txn, product_id).await? {
        Some(p) if p.deleted_at.is_none() && p.quantity >= quantity => p,
        _ => {
            return Err(AppError::unauthorized(
                "Product not found or not enough stock.",
            ));
        }
    };

    let (cart, _) = ensure_cart(&txn, user.user_id).await?;

    let existing = CartItems::find()
        .filter(Column::CartId.eq(cart.id))
        .filter(Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;

    let now = Utc::now();
    let item = if let Some(existing) = existing {
        let merged = existing
            .quantity
            .checked_add(quantity)
            .filter(|&merged| merged <= product.quantity)
            .ok_or_else(|| AppError::unauthorized("Not enough stock for the product."))?;
        let mut active: ActiveModel = existing.into();
        active.quantity = Set(merged);
        active.updated_at = Set(now.into());
        active
            .update(&txn)
            .await
            .map_err(write_failed("Error updating the cart item"))?
    } else {
        ActiveModel {
            id: NotSet,
            cart_id: Set(cart.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(write_failed("Error creating the cart item"))?
    };

    txn.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        cart_id = cart.id,
        product_id,
        quantity = item.quantity,
        "cart item stored"
    );

    Ok(ApiResponse::success("OK", CartItem::from(item), None))
}

/// Sets an item's quantity. A quantity of zero or less deletes the item and the
/// returned snapshot reports quantity 0.
pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    cart_item_id: i32,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_permission(user, Action::ManageCartItems)?;
    let quantity = payload.quantity;

    let txn = state.orm.begin().await?;
    find_active_user(&txn, user.user_id).await?;
    let OwnedCartItem { item, .. } = load_owned_item(&txn, user.user_id, cart_item_id).await?;

    let product = lock_product(&txn, item.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found."))?;

    if quantity > product.quantity {
        return Err(AppError::bad_request(format!(
            "Requested quantity ({quantity}) exceeds available stock ({}).",
            product.quantity
        )));
    }

    if quantity <= 0 {
        CartItems::delete_by_id(item.id)
            .exec(&txn)
            .await
            .map_err(write_failed("Error deleting the cart item"))?;
        txn.commit().await?;

        tracing::info!(user_id = user.user_id, cart_item_id, "cart item removed by zero quantity");
        let mut removed = CartItem::from(item);
        removed.quantity = 0;
        return Ok(ApiResponse::success("Removed from cart", removed, None));
    }

    if product.deleted_at.is_some() {
        return Err(AppError::bad_request("Product is no longer available."));
    }

    let mut active: ActiveModel = item.into();
    active.quantity = Set(quantity);
    active.updated_at = Set(Utc::now().into());
    let updated = active
        .update(&txn)
        .await
        .map_err(write_failed("Error updating the cart item"))?;
    txn.commit().await?;

    tracing::info!(user_id = user.user_id, cart_item_id, quantity, "cart item updated");

    Ok(ApiResponse::success("Updated", CartItem::from(updated), None))
}

pub async fn delete_cart_item(
    state: &AppState,
    user: &AuthUser,
    cart_item_id: i32,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_permission(user, Action::ManageCartItems)?;
    find_active_user(&state.orm, user.user_id).await?;
    let OwnedCartItem { item, .. } =
        load_owned_item(&state.orm, user.user_id, cart_item_id).await?;

    CartItems::delete_by_id(item.id)
        .exec(&state.orm)
        .await
        .map_err(write_failed("Error deleting the cart item"))?;

    tracing::info!(user_id = user.user_id, cart_item_id, "cart item deleted");

    Ok(ApiResponse::success(
        "Removed from cart",
        CartItem::from(item),
        None,
    ))
}
