pub mod cart_items;
pub mod carts;
pub mod products;
pub mod roles;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use products::Entity as Products;
pub use roles::Entity as Roles;
pub use users::Entity as Users;
