use chrono::Utc;
use sea_orm_migration::prelude::*;

use super::m20241223_000001_create_tables::Roles;
use crate::roles::Role;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        let mut insert = Query::insert();
        insert.into_table(Roles::Table).columns([
            Roles::Id,
            Roles::Name,
            Roles::Description,
            Roles::CreatedAt,
        ]);
        for role in Role::ALL {
            insert.values_panic([
                role.id().into(),
                role.name().into(),
                role.description().into(),
                now.into(),
            ]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Roles::Table)
            .and_where(Expr::col(Roles::Id).is_in(Role::ALL.map(Role::id)))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
