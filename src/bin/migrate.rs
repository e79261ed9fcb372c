//! `migrate [up|down|status]`, defaulting to `up`.

use sea_orm_migration::MigratorTrait;
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    migration::Migrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    match std::env::args().nth(1).as_deref().unwrap_or("up") {
        "up" => {
            run_migrations(&orm).await?;
            println!("Migrations applied");
        }
        "down" => {
            Migrator::down(&orm, Some(1)).await?;
            println!("Rolled back the last migration");
        }
        "status" => Migrator::status(&orm).await?,
        other => anyhow::bail!("unknown command `{other}`, expected up, down or status"),
    }
    Ok(())
}
