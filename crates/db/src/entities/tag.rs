//! Tag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    /// NULL for tags that came with the seed data
    #[sea_orm(nullable)]
    pub created_by: Option<i64>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,

    #[sea_orm(has_many = "super::joke_tag::Entity")]
    JokeTags,

    #[sea_orm(has_many = "super::preferred_tag::Entity")]
    PreferredTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::joke_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JokeTags.def()
    }
}

impl Related<super::preferred_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PreferredTags.def()
    }
}

impl Related<super::joke::Entity> for Entity {
    fn to() -> RelationDef {
        super::joke_tag::Relation::Joke.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::joke_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
