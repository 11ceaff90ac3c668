//! Create dish table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dish::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dish::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Dish::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(Dish::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Dish::Position).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dish_event")
                            .from(Dish::Table, Dish::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: event_id (for listing an event's dishes)
        manager
            .create_index(
                Index::create()
                    .name("idx_dish_event_id")
                    .table(Dish::Table)
                    .col(Dish::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dish::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Dish {
    Table,
    Id,
    EventId,
    Name,
    Position,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
