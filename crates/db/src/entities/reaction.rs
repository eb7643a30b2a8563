//! Reaction catalog entity (laughing, thinking, dislike).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reactions")]
pub struct Model {
    /// Explicit id; the catalog uses 1, 0 and -1
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub emoji: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::joke_reaction::Entity")]
    JokeReactions,
}

impl Related<super::joke_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JokeReactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
