//! Schema migrations, applied by `db::run_migrations` and the `migrate` binary.

use sea_orm_migration::prelude::*;

mod m20241223_000001_create_tables;
mod m20241223_000002_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241223_000001_create_tables::Migration),
            Box::new(m20241223_000002_seed_roles::Migration),
        ]
    }
}
