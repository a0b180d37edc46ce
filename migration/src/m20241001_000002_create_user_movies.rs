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
                    .table(UserMovies::Table)
                    .if_not_exists()
                    .col(pk_auto(UserMovies::Id))
                    .col(integer(UserMovies::UserId))
                    .col(integer(UserMovies::MovieId))
                    .col(string_len(UserMovies::Category, 50))
                    .col(big_integer(UserMovies::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_movies_user")
                            .from(UserMovies::Table, UserMovies::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (user, movie, list); inserts race on this instead of a prior read.
        manager
            .create_index(
                Index::create()
                    .name("idx_user_movies_unique")
                    .table(UserMovies::Table)
                    .col(UserMovies::UserId)
                    .col(UserMovies::MovieId)
                    .col(UserMovies::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_movies_user_category")
                    .table(UserMovies::Table)
                    .col(UserMovies::UserId)
                    .col(UserMovies::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserMovies::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserMovies {
    Table,
    Id,
    UserId,
    MovieId,
    Category,
    CreatedAt,
}
