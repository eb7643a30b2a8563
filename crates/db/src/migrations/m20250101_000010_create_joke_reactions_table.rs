//! Create joke_reactions table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JokeReactions::Table)
                    .col(
                        ColumnDef::new(JokeReactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JokeReactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(JokeReactions::JokeId).integer().not_null())
                    .col(ColumnDef::new(JokeReactions::ReactionId).integer().not_null())
                    .col(
                        ColumnDef::new(JokeReactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JokeReactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_joke_reactions_user")
                            .from(JokeReactions::Table, JokeReactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_joke_reactions_joke")
                            .from(JokeReactions::Table, JokeReactions::JokeId)
                            .to(Jokes::Table, Jokes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_joke_reactions_reaction")
                            .from(JokeReactions::Table, JokeReactions::ReactionId)
                            .to(Reactions::Table, Reactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, joke_id) - one reaction per user per joke
        manager
            .create_index(
                Index::create()
                    .name("idx_joke_reactions_user_joke")
                    .table(JokeReactions::Table)
                    .col(JokeReactions::UserId)
                    .col(JokeReactions::JokeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: joke_id (for counting reactions on a joke)
        manager
            .create_index(
                Index::create()
                    .name("idx_joke_reactions_joke_id")
                    .table(JokeReactions::Table)
                    .col(JokeReactions::JokeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JokeReactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum JokeReactions {
    Table,
    Id,
    UserId,
    JokeId,
    ReactionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Jokes {
    Table,
    Id,
}

#[derive(Iden)]
enum Reactions {
    Table,
    Id,
}
