//! Create `contact` table.
//! One row per contact; `filename` points at an uploaded image in the file store.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // serial ids are never handed out twice, even after deletes
        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(pk_auto(Contact::Id))
                    .col(string_len(Contact::FirstName, 128).not_null())
                    .col(string_len(Contact::LastName, 128).not_null())
                    .col(string_len_null(Contact::Title, 128))
                    .col(string_len(Contact::Email, 256).not_null())
                    .col(string_len(Contact::Phone, 64).not_null())
                    .col(string_len_null(Contact::Filename, 256))
                    .col(timestamp_with_time_zone(Contact::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Contact::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contact::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Contact {
    Table,
    Id,
    FirstName,
    LastName,
    Title,
    Email,
    Phone,
    Filename,
    CreatedAt,
    UpdatedAt,
}
