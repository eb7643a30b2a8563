//! Create preferred_tags table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PreferredTags::Table)
                    .col(
                        ColumnDef::new(PreferredTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PreferredTags::ChatId).big_integer().not_null())
                    .col(ColumnDef::new(PreferredTags::TagId).integer().not_null())
                    .col(
                        ColumnDef::new(PreferredTags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PreferredTags::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_preferred_tags_chat")
                            .from(PreferredTags::Table, PreferredTags::ChatId)
                            .to(Chats::Table, Chats::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_preferred_tags_tag")
                            .from(PreferredTags::Table, PreferredTags::TagId)
                            .to(Tags::Table, Tags::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (chat_id, tag_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_preferred_tags_chat_tag")
                    .table(PreferredTags::Table)
                    .col(PreferredTags::ChatId)
                    .col(PreferredTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (for reverse lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_preferred_tags_tag_id")
                    .table(PreferredTags::Table)
                    .col(PreferredTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PreferredTags::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PreferredTags {
    Table,
    Id,
    ChatId,
    TagId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Chats {
    Table,
    Id,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
}
