//! Joke tag entity (join table between jokes and tags).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "joke_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub joke_id: i32,

    #[sea_orm(indexed)]
    pub tag_id: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::joke::Entity",
        from = "Column::JokeId",
        to = "super::joke::Column::Id"
    )]
    Joke,

    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagId",
        to = "super::tag::Column::Id"
    )]
    Tag,
}

impl Related<super::joke::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Joke.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
