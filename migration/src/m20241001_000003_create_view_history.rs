use sea_orm_migration::{prelude::*, schema::*};

use crate::m20241001_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ViewHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(ViewHistory::Id))
                    .col(integer(ViewHistory::UserId))
                    .col(integer(ViewHistory::MovieId))
                    .col(big_integer(ViewHistory::ViewedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_view_history_user")
                            .from(ViewHistory::Table, ViewHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_view_history_unique")
                    .table(ViewHistory::Table)
                    .col(ViewHistory::UserId)
                    .col(ViewHistory::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ViewHistory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ViewHistory {
    Table,
    Id,
    UserId,
    MovieId,
    ViewedAt,
}
