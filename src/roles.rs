//! Role registry and the permission table.
//!
//! Roles are reference data seeded by the migrations with stable ids. Every
//! role-gated operation is listed in [`Action`] and resolved by [`Role::permits`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Seller,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BrowseCatalog,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    CreateCart,
    ManageCartItems,
    ViewProfile,
    ListUsers,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Seller, Role::Customer];

    pub fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Seller => 2,
            Role::Customer => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Customer => "customer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Admin => "Administrator role with full access",
            Role::Seller => "Seller role with permissions to manage products",
            Role::Customer => "Customer role with basic access",
        }
    }

    pub fn permits(self, action: Action) -> bool {
        match action {
            Action::CreateProduct | Action::UpdateProduct | Action::DeleteProduct => {
                matches!(self, Role::Admin | Role::Seller)
            }
            Action::ListUsers => self == Role::Admin,
            Action::BrowseCatalog
            | Action::CreateCart
            | Action::ManageCartItems
            | Action::ViewProfile => true,
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = i32;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Role::ALL.into_iter().find(|role| role.id() == id).ok_or(id)
    }
}
