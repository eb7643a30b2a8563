//! Joke entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of a joke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum JokeStatus {
    /// Being written, not submitted yet.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Submitted and waiting to be published.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Eligible for delivery to chats.
    #[sea_orm(string_value = "published")]
    Published,
    /// Withdrawn from delivery.
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jokes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user who submitted the joke
    #[sea_orm(indexed)]
    pub add_by: i64,

    pub language_code: String,

    #[sea_orm(column_type = "Text", unique)]
    pub content: String,

    pub status: JokeStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Rewritten on every update, see `ActiveModelBehavior` below
    pub updated_at: DateTimeWithTimeZone,

    /// Set when the joke is soft-deleted
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AddBy",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageCode",
        to = "super::language::Column::Code"
    )]
    Language,

    #[sea_orm(has_many = "super::joke_tag::Entity")]
    JokeTags,

    #[sea_orm(has_many = "super::joke_reaction::Entity")]
    JokeReactions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl Related<super::joke_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JokeTags.def()
    }
}

impl Related<super::joke_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JokeReactions.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::joke_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::joke_tag::Relation::Joke.def().rev())
    }
}

impl Model {
    /// Whether the joke has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Touch `updated_at` on every update, overriding whatever the caller set.
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(chrono::Utc::now().into());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_values() {
        assert_eq!(JokeStatus::Draft.to_value(), "draft");
        assert_eq!(JokeStatus::Pending.to_value(), "pending");
        assert_eq!(JokeStatus::Published.to_value(), "published");
        assert_eq!(JokeStatus::Archived.to_value(), "archived");
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(JokeStatus::try_from_value(&"deleted".to_string()).is_err());
        assert_eq!(
            JokeStatus::try_from_value(&"published".to_string()).unwrap_or(JokeStatus::Draft),
            JokeStatus::Published
        );
    }
}
