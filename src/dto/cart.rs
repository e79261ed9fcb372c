use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCartItemRequest {
    pub product_id: i32,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
}

/// A quantity of zero or less removes the item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: i32,
    pub quantity: i32,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartItemList {
    #[schema(value_type = Vec<CartItemDto>)]
    pub items: Vec<CartItemDto>,
}
