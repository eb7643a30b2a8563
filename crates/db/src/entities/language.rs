//! Language entity (reference data).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "languages")]
pub struct Model {
    /// ISO 639-1 code, e.g. "en"
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,

    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::joke::Entity")]
    Jokes,

    #[sea_orm(has_many = "super::settings::Entity")]
    Settings,
}

impl Related<super::joke::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jokes.def()
    }
}

impl Related<super::settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
