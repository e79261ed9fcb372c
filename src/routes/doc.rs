use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AccessTokenResponse, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest},
        cart::{CartItemDto, CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
        products::{CreateProductRequest, ProductList, ProductWithOwner, UpdateProductRequest},
        users::{CartRef, ProductRef, ProfileCart, ProfileCartItem, UserList, UserListItem, UserProfile},
    },
    models::{Cart, CartItem, Product, ProductOwner, RoleSummary, User},
    response::{ApiResponse, Meta},
    roles::Role,
    routes::{auth, cart, cart_item, health, params, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh,
        auth::profile,
        auth::logout,
        products::list_products,
        products::sku_validation,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::create_cart,
        cart_item::cart_item_list,
        cart_item::add_cart_item,
        cart_item::update_cart_item,
        cart_item::remove_cart_item,
        users::list_users
    ),
    components(
        schemas(
            User,
            Role,
            RoleSummary,
            Product,
            ProductOwner,
            Cart,
            CartItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            AccessTokenResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductWithOwner,
            ProductList,
            CreateCartItemRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartItemList,
            ProductRef,
            ProfileCartItem,
            ProfileCart,
            UserProfile,
            CartRef,
            UserListItem,
            UserList,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            params::UserSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartItem>,
            ApiResponse<CartItemList>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and tokens"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Cart and cart items"),
        (name = "Users", description = "User administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
