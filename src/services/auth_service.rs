use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

use crate::{
    config::AppConfig,
    dto::{
        auth::{
            AccessTokenResponse, Claims, LoginRequest, LoginResponse, RefreshRequest,
            RegisterRequest, TokenKind,
        },
        users::{ProductRef, ProfileCart, ProfileCartItem, UserProfile},
    },
    entity::{
        cart_items::{Column as ItemCol, Entity as CartItems},
        products::Entity as Products,
        roles::Entity as Roles,
        users::{ActiveModel, Column, Entity as Users},
    },
    error::{AppError, AppResult, is_unique_violation, write_failed},
    middleware::auth::{AuthUser, ensure_permission},
    models::{RoleSummary, User},
    response::{ApiResponse, Meta},
    roles::{Action, Role},
    services::{
        cart_service::find_cart_for_user,
        user_service::{find_active_user, role_of},
    },
    state::AppState,
};

const EMAIL_TAKEN: &str = "Email is already registered.";
const INVALID_CREDENTIALS: &str = "Invalid credentials.";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Signs a token of the given kind; access tokens live for hours, refresh tokens for days.
pub fn issue_token(
    config: &AppConfig,
    user_id: i32,
    email: &str,
    role: Role,
    kind: TokenKind,
) -> AppResult<String> {
    let ttl = match kind {
        TokenKind::Access => Duration::hours(config.access_token_ttl_hours),
        TokenKind::Refresh => Duration::days(config.refresh_token_ttl_days),
    };
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.id(),
        kind,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(secret: &str, token: &str, expected: TokenKind) -> AppResult<AuthUser> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;
    let claims = data.claims;

    if claims.kind != expected {
        return Err(AppError::unauthorized("Invalid or expired token"));
    }

    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::unauthorized("Invalid token subject"))?;
    let role = Role::try_from(claims.role)
        .map_err(|_| AppError::unauthorized("Invalid token role"))?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
        role,
    })
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let role = Roles::find_by_id(payload.role)
        .one(&state.orm)
        .await?
        .and_then(|row| Role::try_from(row.id).ok())
        .ok_or_else(|| AppError::unauthorized("Role not found."))?;
    if role == Role::Admin {
        tracing::warn!(%email, "attempt to self-register as admin");
        return Err(AppError::Forbidden);
    }

    let exists = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::unauthorized(EMAIL_TAKEN));
    }

    let now = Utc::now();
    let user = ActiveModel {
        id: NotSet,
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        role_id: Set(role.id()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::unauthorized(EMAIL_TAKEN)
        } else {
            write_failed("Error registering user")(err)
        }
    })?;

    tracing::info!(user_id = user.id, role = role.name(), "user registered");

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let user = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .filter(Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let role = role_of(&user)?;
    let resp = LoginResponse {
        access_token: issue_token(&state.config, user.id, &user.email, role, TokenKind::Access)?,
        refresh_token: issue_token(&state.config, user.id, &user.email, role, TokenKind::Refresh)?,
    };

    tracing::info!(user_id = user.id, "user logged in");

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn refresh_access_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AccessTokenResponse>> {
    payload.validate()?;
    let claims = decode_token(
        &state.config.jwt_secret,
        payload.refresh_token.trim(),
        TokenKind::Refresh,
    )?;

    // Re-read the user so a deleted account or a changed role is picked up.
    let user = find_active_user(&state.orm, claims.user_id).await?;
    let role = role_of(&user)?;
    let access_token = issue_token(&state.config, user.id, &user.email, role, TokenKind::Access)?;

    Ok(ApiResponse::success(
        "Token refreshed",
        AccessTokenResponse { access_token },
        None,
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    ensure_permission(user, Action::ViewProfile)?;
    let row = find_active_user(&state.orm, user.user_id).await?;
    let role = role_of(&row)?;

    let cart = match find_cart_for_user(&state.orm, row.id).await? {
        Some(cart) => {
            let items = CartItems::find()
                .filter(ItemCol::CartId.eq(cart.id))
                .order_by_asc(ItemCol::Id)
                .find_also_related(Products)
                .all(&state.orm)
                .await?
                .into_iter()
                .filter_map(|(item, product)| {
                    product.map(|p| ProfileCartItem {
                        id: item.id,
                        quantity: item.quantity,
                        product: ProductRef {
                            id: p.id,
                            name: p.name,
                        },
                    })
                })
                .collect();
            Some(ProfileCart { id: cart.id, items })
        }
        None => None,
    };

    let profile = UserProfile {
        id: row.id,
        email: row.email,
        role: RoleSummary::from(role),
        cart,
    };
    Ok(ApiResponse::success("Profile", profile, None))
}
