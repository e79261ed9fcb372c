use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::users::UserList, error::AppResult, middleware::auth::AuthUser, response::ApiResponse,
    routes::params::UserListQuery, services::user_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/list", get(list_users))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/list",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("email" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("role" = Option<i32>, Query, description = "Role id"),
        ("sort" = Option<String>, Query, description = "id | email | created_at"),
        ("order" = Option<String>, Query, description = "asc | desc"),
    ),
    responses(
        (status = 200, description = "Users with role and cart", body = ApiResponse<UserList>),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}
