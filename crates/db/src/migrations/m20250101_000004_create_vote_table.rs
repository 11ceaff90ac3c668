//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Vote::DishId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UserName).string_len(256).not_null())
                    .col(ColumnDef::new(Vote::Rating).integer().not_null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_dish")
                            .from(Vote::Table, Vote::DishId)
                            .to(Dish::Table, Dish::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: dish_id (for aggregating a dish's votes)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_dish_id")
                    .table(Vote::Table)
                    .col(Vote::DishId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    DishId,
    UserName,
    Rating,
    CreatedAt,
}

#[derive(Iden)]
enum Dish {
    Table,
    Id,
}
