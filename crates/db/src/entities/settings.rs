//! Per-chat delivery settings (exactly one row per chat).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// On/off switch stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    #[sea_orm(string_value = "on")]
    On,
    #[sea_orm(string_value = "off")]
    Off,
}

impl Switch {
    /// The opposite position.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Yes/no flag stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    #[sea_orm(string_value = "yes")]
    Yes,
    #[sea_orm(string_value = "no")]
    No,
}

impl YesNo {
    /// The opposite answer.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub chat_id: i64,

    pub preferred_language: String,

    /// Seconds between two jokes
    pub schedule: i32,

    pub sending_jokes: Switch,

    /// Whether the previous joke is removed when a new one is sent
    pub delete_last_joke: YesNo,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chat::Entity",
        from = "Column::ChatId",
        to = "super::chat::Column::Id"
    )]
    Chat,

    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::PreferredLanguage",
        to = "super::language::Column::Code"
    )]
    Language,
}

impl Related<super::chat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chat.def()
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_toggle() {
        assert_eq!(Switch::On.toggled(), Switch::Off);
        assert_eq!(Switch::Off.toggled(), Switch::On);
        assert!(Switch::On.is_on());
    }

    #[test]
    fn test_yes_no_toggle() {
        assert_eq!(YesNo::Yes.toggled(), YesNo::No);
        assert!(!YesNo::No.is_yes());
    }

    #[test]
    fn test_string_values() {
        assert_eq!(Switch::Off.to_value(), "off");
        assert_eq!(YesNo::Yes.to_value(), "yes");
    }
}
