//! Create joke_tags table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JokeTags::Table)
                    .col(
                        ColumnDef::new(JokeTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JokeTags::JokeId).integer().not_null())
                    .col(ColumnDef::new(JokeTags::TagId).integer().not_null())
                    .col(
                        ColumnDef::new(JokeTags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JokeTags::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_joke_tags_joke")
                            .from(JokeTags::Table, JokeTags::JokeId)
                            .to(Jokes::Table, Jokes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_joke_tags_tag")
                            .from(JokeTags::Table, JokeTags::TagId)
                            .to(Tags::Table, Tags::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (joke_id, tag_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_joke_tags_joke_tag")
                    .table(JokeTags::Table)
                    .col(JokeTags::JokeId)
                    .col(JokeTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (for filtering jokes by tag)
        manager
            .create_index(
                Index::create()
                    .name("idx_joke_tags_tag_id")
                    .table(JokeTags::Table)
                    .col(JokeTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JokeTags::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum JokeTags {
    Table,
    Id,
    JokeId,
    TagId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Jokes {
    Table,
    Id,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
}
