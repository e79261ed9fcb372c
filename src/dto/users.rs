use serde::Serialize;
use utoipa::ToSchema;

use crate::models::RoleSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileCartItem {
    pub id: i32,
    pub quantity: i32,
    pub product: ProductRef,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileCart {
    pub id: i32,
    pub items: Vec<ProfileCartItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub role: RoleSummary,
    pub cart: Option<ProfileCart>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartRef {
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListItem {
    pub id: i32,
    pub email: String,
    pub role: RoleSummary,
    pub cart: Option<CartRef>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserListItem>)]
    pub items: Vec<UserListItem>,
}
