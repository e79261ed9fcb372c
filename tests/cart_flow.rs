mod common;

use common::{create_product, create_user, setup_state};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use storefront_api::{
    dto::cart::{CreateCartItemRequest, UpdateCartItemRequest},
    entity::{cart_items, carts, products},
    error::AppError,
    roles::Role,
    services::{cart_item_service, cart_service, product_service},
};

fn add(product_id: i32, quantity: i32) -> CreateCartItemRequest {
    CreateCartItemRequest {
        product_id,
        quantity,
    }
}

#[tokio::test]
async fn listing_without_a_cart_is_empty() {
    let state = setup_state().await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;

    let resp = cart_item_service::get_cart_items(&state, &shopper)
        .await
        .unwrap();
    assert!(resp.data.unwrap().items.is_empty());
    assert_eq!(carts::Entity::find().count(&state.orm).await.unwrap(), 0);
}

#[tokio::test]
async fn adding_an_item_creates_the_cart_lazily() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 10, Decimal::new(1200, 2)).await;

    let item = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(item.quantity, 2);

    let cart = carts::Entity::find()
        .filter(carts::Column::UserId.eq(shopper.user_id))
        .one(&state.orm)
        .await
        .unwrap()
        .expect("cart created on first add");
    assert_eq!(item.cart_id, cart.id);

    let listed = cart_item_service::get_cart_items(&state, &shopper)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].product.id, product_id);
}

#[tokio::test]
async fn adding_more_than_stock_fails_without_side_effects() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 2, Decimal::new(1200, 2)).await;

    let err = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(cart_items::Entity::find().count(&state.orm).await.unwrap(), 0);
    assert_eq!(carts::Entity::find().count(&state.orm).await.unwrap(), 0);
}

#[tokio::test]
async fn merge_that_would_overflow_is_rejected() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id =
        create_product(&state, &seller, "MUG-1", i32::MAX, Decimal::new(1200, 2)).await;

    cart_item_service::create_cart_item(&state, &shopper, add(product_id, i32::MAX))
        .await
        .unwrap();
    let err = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let stored = cart_items::Entity::find()
        .filter(cart_items::Column::ProductId.eq(product_id))
        .one(&state.orm)
        .await
        .unwrap()
        .expect("item kept");
    assert_eq!(stored.quantity, i32::MAX);
}

#[tokio::test]
async fn adding_an_unknown_product_fails() {
    let state = setup_state().await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;

    let err = cart_item_service::create_cart_item(&state, &shopper, add(9999, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;

    let err = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn repeated_adds_merge_into_one_row() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 10, Decimal::new(1200, 2)).await;

    let first = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();
    let second = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 3))
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);
    assert_eq!(cart_items::Entity::find().count(&state.orm).await.unwrap(), 1);
}

#[tokio::test]
async fn merged_quantity_is_checked_against_stock() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;

    let first = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 3))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(first.quantity, 3);

    let err = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let stored = cart_items::Entity::find_by_id(first.id)
        .one(&state.orm)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 3);
}

#[tokio::test]
async fn update_sets_quantity_and_checks_stock() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;
    let item = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 1))
        .await
        .unwrap()
        .data
        .unwrap();

    let updated = cart_item_service::update_cart_item(
        &state,
        &shopper,
        item.id,
        UpdateCartItemRequest { quantity: 4 },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.quantity, 4);

    let err = cart_item_service::update_cart_item(
        &state,
        &shopper,
        item.id,
        UpdateCartItemRequest { quantity: 6 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn update_to_zero_removes_the_item() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;
    let item = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();

    let removed = cart_item_service::update_cart_item(
        &state,
        &shopper,
        item.id,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await
    .unwrap()
    .data
    .unwrap();

    assert_eq!(removed.id, item.id);
    assert_eq!(removed.quantity, 0);
    assert!(
        cart_items::Entity::find_by_id(item.id)
            .one(&state.orm)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn deleting_twice_fails_the_second_time() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;
    let item = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();

    let deleted = cart_item_service::delete_cart_item(&state, &shopper, item.id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(deleted.quantity, 2);

    let err = cart_item_service::delete_cart_item(&state, &shopper, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn foreign_items_cannot_be_touched() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let owner = create_user(&state, "owner@example.com", Role::Customer).await;
    let intruder = create_user(&state, "intruder@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;
    let item = cart_item_service::create_cart_item(&state, &owner, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();

    let err = cart_item_service::update_cart_item(
        &state,
        &intruder,
        item.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = cart_item_service::delete_cart_item(&state, &intruder, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let stored = cart_items::Entity::find_by_id(item.id)
        .one(&state.orm)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 2);
}

#[tokio::test]
async fn items_of_soft_deleted_products_stay_listed() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;
    let item = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap()
        .data
        .unwrap();

    product_service::delete_product(&state, &seller, product_id)
        .await
        .unwrap();

    let listed = cart_item_service::get_cart_items(&state, &shopper)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert!(listed.items[0].product.deleted_at.is_some());

    let err = cart_item_service::update_cart_item(
        &state,
        &shopper,
        item.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Shrinking to zero still removes it.
    cart_item_service::update_cart_item(
        &state,
        &shopper,
        item.id,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await
    .unwrap();
    assert_eq!(cart_items::Entity::find().count(&state.orm).await.unwrap(), 0);
}

#[tokio::test]
async fn stock_changes_are_seen_by_later_adds() {
    let state = setup_state().await;
    let seller = create_user(&state, "seller@example.com", Role::Seller).await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;
    let product_id = create_product(&state, &seller, "MUG-1", 5, Decimal::new(1200, 2)).await;

    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await
        .unwrap()
        .unwrap();
    let mut active: products::ActiveModel = product.into();
    active.quantity = Set(1);
    active.update(&state.orm).await.unwrap();

    let err = cart_item_service::create_cart_item(&state, &shopper, add(product_id, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn explicit_cart_creation_is_once_per_user() {
    let state = setup_state().await;
    let first = create_user(&state, "first@example.com", Role::Customer).await;
    let second = create_user(&state, "second@example.com", Role::Seller).await;

    let cart = cart_service::create_cart(&state, &first)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(cart.user_id, first.user_id);

    let err = cart_service::create_cart(&state, &first).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let other = cart_service::create_cart(&state, &second)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_ne!(other.id, cart.id);
    assert_eq!(carts::Entity::find().count(&state.orm).await.unwrap(), 2);
}

#[tokio::test]
async fn ensure_cart_is_idempotent() {
    let state = setup_state().await;
    let shopper = create_user(&state, "shopper@example.com", Role::Customer).await;

    let (first, created) = cart_service::ensure_cart(&state.orm, shopper.user_id)
        .await
        .unwrap();
    assert!(created);
    let (again, created) = cart_service::ensure_cart(&state.orm, shopper.user_id)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(first.id, again.id);
}

#[tokio::test]
async fn cart_creation_for_unknown_user_fails() {
    let state = setup_state().await;
    let ghost = storefront_api::middleware::auth::AuthUser {
        user_id: 4242,
        email: "ghost@example.com".into(),
        role: Role::Customer,
    };

    let err = cart_service::create_cart(&state, &ghost).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}
