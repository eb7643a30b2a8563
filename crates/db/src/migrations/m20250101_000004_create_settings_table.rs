//! Create settings table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::ChatId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Settings::PreferredLanguage)
                            .string_len(8)
                            .not_null()
                            .default("en"),
                    )
                    .col(
                        ColumnDef::new(Settings::Schedule)
                            .integer()
                            .not_null()
                            .default(600),
                    )
                    .col(
                        ColumnDef::new(Settings::SendingJokes)
                            .string_len(8)
                            .not_null()
                            .default("off"),
                    )
                    .col(
                        ColumnDef::new(Settings::DeleteLastJoke)
                            .string_len(8)
                            .not_null()
                            .default("yes"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settings_chat")
                            .from(Settings::Table, Settings::ChatId)
                            .to(Chats::Table, Chats::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settings_language")
                            .from(Settings::Table, Settings::PreferredLanguage)
                            .to(Languages::Table, Languages::Code),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: chat_id - exactly one settings row per chat
        manager
            .create_index(
                Index::create()
                    .name("idx_settings_chat_id")
                    .table(Settings::Table)
                    .col(Settings::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    ChatId,
    PreferredLanguage,
    Schedule,
    SendingJokes,
    DeleteLastJoke,
}

#[derive(Iden)]
enum Chats {
    Table,
    Id,
}

#[derive(Iden)]
enum Languages {
    Table,
    Code,
}
