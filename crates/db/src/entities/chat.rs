//! Chat entity (a conversation the bot takes part in).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of chat, as reported by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-to-one conversation with a user.
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "group")]
    Group,
    #[sea_orm(string_value = "supergroup")]
    Supergroup,
    #[sea_orm(string_value = "channel")]
    Channel,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chats")]
pub struct Model {
    /// Chat platform chat id, assigned externally
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    #[sea_orm(column_name = "type")]
    pub chat_type: ChatType,

    #[sea_orm(nullable)]
    pub username: Option<String>,

    /// Id of the last message the bot sent here
    #[sea_orm(nullable)]
    pub last_message_id: Option<i64>,

    /// Owner for private chats
    #[sea_orm(nullable, indexed)]
    pub user_id: Option<i64>,

    /// Epoch seconds of the last delivered joke, 0 if none yet
    #[sea_orm(default_value = 0)]
    pub last_joke_sent_at: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_one = "super::settings::Entity")]
    Settings,

    #[sea_orm(has_many = "super::preferred_tag::Entity")]
    PreferredTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl Related<super::preferred_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PreferredTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::preferred_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::preferred_tag::Relation::Chat.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
