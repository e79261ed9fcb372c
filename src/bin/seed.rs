use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{products, users},
    roles::Role,
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "Admin#123", Role::Admin).await?;
    let seller_id = ensure_user(&orm, "seller@example.com", "Seller#123", Role::Seller).await?;
    let customer_id =
        ensure_user(&orm, "customer@example.com", "Customer#123", Role::Customer).await?;
    seed_products(&orm, seller_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Seller ID: {seller_id}, Customer ID: {customer_id}"
    );
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password)?;
    let now = Utc::now();

    users::Entity::insert(users::ActiveModel {
        id: NotSet,
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role_id: Set(role.id()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    })
    .on_conflict(
        OnConflict::column(users::Column::Email)
            .update_column(users::Column::RoleId)
            .to_owned(),
    )
    .exec_without_returning(orm)
    .await?;

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("seeded user {email} not found"))?;

    println!("Ensured user {email} (role={})", role.name());
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection, owner_id: i32) -> anyhow::Result<()> {
    let catalog = vec![
        ("Axum Hoodie", "HOODIE-AXUM", 50, Decimal::new(5500, 2)),
        ("Ferris Mug", "MUG-FERRIS", 100, Decimal::new(1200, 2)),
        ("Rust Sticker Pack", "STICKER-RUST", 200, Decimal::new(500, 2)),
        ("E-book: Async Rust", "EBOOK-ASYNC", 75, Decimal::new(2500, 2)),
    ];

    for (name, sku, quantity, price) in catalog {
        let exists = products::Entity::find()
            .filter(products::Column::Sku.eq(sku))
            .filter(products::Column::DeletedAt.is_null())
            .one(orm)
            .await?;
        if exists.is_some() {
            continue;
        }

        let now = Utc::now();
        products::Entity::insert(products::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            sku: Set(sku.to_string()),
            quantity: Set(quantity),
            price: Set(price),
            user_id: Set(owner_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        })
        .exec_without_returning(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
