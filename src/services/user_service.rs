use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, Func},
};

use crate::{
    dto::users::{CartRef, UserList, UserListItem},
    entity::{
        carts::{Column as CartCol, Entity as Carts},
        users::{Column, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_permission},
    models::RoleSummary,
    response::{ApiResponse, Meta},
    roles::{Action, Role},
    routes::params::{SortOrder, UserListQuery, UserSortBy},
    state::AppState,
};

/// Resolves a caller id to a live user row; every cart and catalog operation starts here.
pub async fn find_active_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<UserModel> {
    Users::find_by_id(user_id)
        .filter(Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found."))
}

pub fn role_of(user: &UserModel) -> AppResult<Role> {
    Role::try_from(user.role_id).map_err(|id| {
        AppError::Internal(anyhow::anyhow!("user {} has unknown role {id}", user.id))
    })
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_permission(user, Action::ListUsers)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(email) = query.email.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", email.trim().to_lowercase());
        condition = condition.add(Expr::expr(Func::lower(Expr::col((Users, Column::Email)))).like(pattern));
    }
    if let Some(role) = query.role {
        condition = condition.add(Column::RoleId.eq(role));
    }

    let sort_col = match query.sort.unwrap_or(UserSortBy::Id) {
        UserSortBy::Id => Column::Id,
        UserSortBy::Email => Column::Email,
        UserSortBy::CreatedAt => Column::CreatedAt,
    };
    let mut finder = Users::find().filter(condition);
    finder = match query.order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let carts: HashMap<i32, i32> = Carts::find()
        .filter(CartCol::UserId.is_in(users.iter().map(|u| u.id)))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|cart| (cart.user_id, cart.id))
        .collect();

    let items = users
        .into_iter()
        .map(|u| {
            Ok(UserListItem {
                id: u.id,
                email: u.email.clone(),
                role: RoleSummary::from(role_of(&u)?),
                cart: carts.get(&u.id).map(|&id| CartRef { id }),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::paginate("/users/list", page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}
