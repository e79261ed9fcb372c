use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{Product, ProductOwner};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub sku: String,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_update_product"))]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithOwner {
    #[serde(flatten)]
    pub product: Product,
    pub user: Option<ProductOwner>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductWithOwner>)]
    pub items: Vec<ProductWithOwner>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Largest value a `decimal(10,2)` price column holds.
fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

fn price_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("price");
    err.message = Some(message.into());
    err
}

/// Positive, at most two decimal places, within the column range.
fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(price_error("price must be greater than 0"));
    }
    if price.normalize().scale() > 2 {
        return Err(price_error("price must have at most 2 decimal places"));
    }
    if *price > max_price() {
        return Err(price_error("price must not exceed 99999999.99"));
    }
    Ok(())
}

fn validate_update_product(req: &UpdateProductRequest) -> Result<(), ValidationError> {
    if let Some(price) = &req.price {
        positive_price(price)?;
    }
    for value in [&req.name, &req.sku].into_iter().flatten() {
        not_blank(value)?;
    }
    Ok(())
}
