//! One cart per user: `ensure_cart` is the idempotent get-or-create used when an
//! item is added, `create_cart` is the explicit endpoint that refuses a second cart.

use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

use crate::{
    entity::carts::{ActiveModel, Column, Entity as Carts, Model as CartModel},
    error::{AppError, AppResult, is_unique_violation, write_failed},
    middleware::auth::{AuthUser, ensure_permission},
    models::Cart,
    response::{ApiResponse, Meta},
    roles::Action,
    services::user_service::find_active_user,
    state::AppState,
};

pub async fn find_cart_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> AppResult<Option<CartModel>> {
    let cart = Carts::find()
        .filter(Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(cart)
}

/// Returns the user's cart, creating it when missing, and whether it was created here.
///
/// Relies on the unique `carts.user_id` constraint: a concurrent creator makes
/// the insert a no-op and both callers read back the same row.
pub async fn ensure_cart<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<(CartModel, bool)> {
    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let inserted = Carts::insert(active)
        .on_conflict(OnConflict::column(Column::UserId).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict("User already has a cart.".into())
            } else {
                write_failed("Error creating the cart")(err)
            }
        })?;

    let cart = find_cart_for_user(conn, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart for user {user_id} vanished")))?;

    if inserted > 0 {
        tracing::info!(user_id, cart_id = cart.id, "cart created");
    }
    Ok((cart, inserted > 0))
}

pub async fn create_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    ensure_permission(user, Action::CreateCart)?;
    find_active_user(&state.orm, user.user_id).await?;

    if find_cart_for_user(&state.orm, user.user_id).await?.is_some() {
        return Err(AppError::Conflict("User already has a cart.".into()));
    }

    let (cart, created) = ensure_cart(&state.orm, user.user_id).await?;
    if !created {
        return Err(AppError::Conflict("User already has a cart.".into()));
    }

    Ok(ApiResponse::success(
        "Cart created",
        Cart::from(cart),
        Some(Meta::empty()),
    ))
}
