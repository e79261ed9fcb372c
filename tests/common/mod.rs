#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectOptions, Database, Set};
use storefront_api::{
    config::AppConfig,
    db::run_migrations,
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    roles::Role,
    state::AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "integration-test-secret".into(),
        cors_origin: "http://localhost:3000".into(),
        access_token_ttl_hours: 1,
        refresh_token_ttl_days: 1,
    }
}

/// A fresh in-memory database with every migration applied.
///
/// One connection only, so each test sees a single private database.
pub async fn setup_state() -> AppState {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    run_migrations(&orm).await.expect("run migrations");

    AppState {
        orm,
        config: test_config(),
    }
}

pub async fn create_user(state: &AppState, email: &str, role: Role) -> AuthUser {
    let now = Utc::now();
    let user = UserActive {
        id: NotSet,
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role_id: Set(role.id()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await
    .expect("insert user");

    AuthUser {
        user_id: user.id,
        email: user.email,
        role,
    }
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthUser,
    sku: &str,
    quantity: i32,
    price: Decimal,
) -> i32 {
    let now = Utc::now();
    let product = ProductActive {
        id: NotSet,
        name: Set(format!("Product {sku}")),
        sku: Set(sku.to_string()),
        quantity: Set(quantity),
        price: Set(price),
        user_id: Set(owner.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await
    .expect("insert product");

    product.id
}
