//! Create jokes table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jokes::Table)
                    .col(
                        ColumnDef::new(Jokes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jokes::AddBy).big_integer().not_null())
                    .col(ColumnDef::new(Jokes::LanguageCode).string_len(8).not_null())
                    .col(ColumnDef::new(Jokes::Content).text().not_null())
                    .col(
                        ColumnDef::new(Jokes::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Jokes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Jokes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Jokes::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jokes_add_by")
                            .from(Jokes::Table, Jokes::AddBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jokes_language")
                            .from(Jokes::Table, Jokes::LanguageCode)
                            .to(Languages::Table, Languages::Code),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: content - the same joke cannot be stored twice
        manager
            .create_index(
                Index::create()
                    .name("idx_jokes_content")
                    .table(Jokes::Table)
                    .col(Jokes::Content)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: add_by (for listing a user's jokes)
        manager
            .create_index(
                Index::create()
                    .name("idx_jokes_add_by")
                    .table(Jokes::Table)
                    .col(Jokes::AddBy)
                    .to_owned(),
            )
            .await?;

        // Index: (language_code, status) (for random selection)
        manager
            .create_index(
                Index::create()
                    .name("idx_jokes_language_status")
                    .table(Jokes::Table)
                    .col(Jokes::LanguageCode)
                    .col(Jokes::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jokes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Jokes {
    Table,
    Id,
    AddBy,
    LanguageCode,
    Content,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Languages {
    Table,
    Code,
}
