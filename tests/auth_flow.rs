mod common;

use common::{create_product, create_user, setup_state};
use rust_decimal::Decimal;
use storefront_api::{
    dto::{
        auth::{LoginRequest, RefreshRequest, RegisterRequest, TokenKind},
        cart::CreateCartItemRequest,
    },
    error::AppError,
    roles::Role,
    routes::params::UserListQuery,
    services::{auth_service, cart_item_service, user_service},
    state::AppState,
};

const PASSWORD: &str = "Secr3t!pw";

async fn register(state: &AppState, email: &str, role: Role) -> Result<i32, AppError> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role: role.id(),
        },
    )
    .await?;
    Ok(resp.data.unwrap().id)
}

#[tokio::test]
async fn register_then_login_issues_usable_tokens() {
    let state = setup_state().await;
    let id = register(&state, "Seller@Example.com", Role::Seller)
        .await
        .unwrap();

    let tokens = auth_service::login_user(
        &state,
        LoginRequest {
            email: "seller@example.com".into(),
            password: PASSWORD.into(),
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();

    let caller = auth_service::decode_token(
        &state.config.jwt_secret,
        &tokens.access_token,
        TokenKind::Access,
    )
    .unwrap();
    assert_eq!(caller.user_id, id);
    assert_eq!(caller.email, "seller@example.com");
    assert_eq!(caller.role, Role::Seller);

    // The refresh token only works on the refresh path.
    assert!(
        auth_service::decode_token(
            &state.config.jwt_secret,
            &tokens.refresh_token,
            TokenKind::Access
        )
        .is_err()
    );
    let refreshed = auth_service::refresh_access_token(
        &state,
        RefreshRequest {
            refresh_token: tokens.refresh_token,
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    let again = auth_service::decode_token(
        &state.config.jwt_secret,
        &refreshed.access_token,
        TokenKind::Access,
    )
    .unwrap();
    assert_eq!(again.user_id, id);
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let state = setup_state().await;
    register(&state, "shopper@example.com", Role::Customer)
        .await
        .unwrap();
    let tokens = auth_service::login_user(
        &state,
        LoginRequest {
            email: "shopper@example.com".into(),
            password: PASSWORD.into(),
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();

    let err = auth_service::refresh_access_token(
        &state,
        RefreshRequest {
            refresh_token: tokens.access_token,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let state = setup_state().await;
    register(&state, "dup@example.com", Role::Customer)
        .await
        .unwrap();
    let err = register(&state, "DUP@example.com", Role::Seller)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn admin_cannot_self_register_and_unknown_roles_fail() {
    let state = setup_state().await;
    let err = register(&state, "root@example.com", Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "odd@example.com".into(),
            password: PASSWORD.into(),
            role: 42,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn weak_password_fails_validation() {
    let state = setup_state().await;
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "weak@example.com".into(),
            password: "password".into(),
            role: Role::Customer.id(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let state = setup_state().await;
    register(&state, "shopper@example.com", Role::Customer)
        .await
        .unwrap();

    for (email, password) in [
        ("shopper@example.com", "Wr0ng!pw"),
        ("nobody@example.com", PASSWORD),
    ] {
        let err = auth_service::login_user(
            &state,
            LoginRequest {
                email: email.into(),
                password: password.into(),
            },
        )
        .await
        .unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Invalid credentials."),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn profile_includes_role_and_cart() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;

    let profile = auth_service::get_profile(&state, &shopper)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(profile.role.name, "customer");
    assert!(profile.cart.is_none());

    cart_item_service::create_cart_item(
        &state,
        &shopper,
        CreateCartItemRequest {
            product_id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let profile = auth_service::get_profile(&state, &shopper)
        .await
        .unwrap()
        .data
        .unwrap();
    let cart = profile.cart.expect("cart after first add");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].product.id, product_id);
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let state = setup_state().await;
    let admin = create_user(&state, "admin@example.com", Role::Admin).await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    create_user(&state, "shopper@example.com", Role::Customer).await;

    let err = user_service::list_users(&state, &seller, UserListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let all = user_service::list_users(&state, &admin, UserListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.meta.unwrap().total, Some(3));
    assert_eq!(all.data.unwrap().items.len(), 3);

    let sellers = user_service::list_users(
        &state,
        &admin,
        UserListQuery {
            role: Some(Role::Seller.id()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(sellers.items.len(), 1);
    assert_eq!(sellers.items[0].email, "seller@example.com");
    assert_eq!(sellers.items[0].role.name, "seller");
    assert!(sellers.items[0].cart.is_none());

    let by_email = user_service::list_users(
        &state,
        &admin,
        UserListQuery {
            email: Some("SHOP".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(by_email.items.len(), 1);
}
