//! Database migrations.
//!
//! One migration per table, in parent-first order, followed by the
//! reference data. Rolling everything back therefore drops the tables
//! child-first.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_languages_table;
mod m20250101_000002_create_users_table;
mod m20250101_000003_create_chats_table;
mod m20250101_000004_create_settings_table;
mod m20250101_000005_create_jokes_table;
mod m20250101_000006_create_tags_table;
mod m20250101_000007_create_reactions_table;
mod m20250101_000008_create_preferred_tags_table;
mod m20250101_000009_create_joke_tags_table;
mod m20250101_000010_create_joke_reactions_table;
mod m20250101_000011_seed_reference_data;

pub struct Migrator;

impl Migrator {
    /// Migrations that create the tables, in creation order.
    #[must_use]
    pub fn table_migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_languages_table::Migration),
            Box::new(m20250101_000002_create_users_table::Migration),
            Box::new(m20250101_000003_create_chats_table::Migration),
            Box::new(m20250101_000004_create_settings_table::Migration),
            Box::new(m20250101_000005_create_jokes_table::Migration),
            Box::new(m20250101_000006_create_tags_table::Migration),
            Box::new(m20250101_000007_create_reactions_table::Migration),
            Box::new(m20250101_000008_create_preferred_tags_table::Migration),
            Box::new(m20250101_000009_create_joke_tags_table::Migration),
            Box::new(m20250101_000010_create_joke_reactions_table::Migration),
        ]
    }
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        let mut migrations = Self::table_migrations();
        migrations.push(Box::new(m20250101_000011_seed_reference_data::Migration));
        migrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_names_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(names.len(), 11);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "m20250101_000001_create_languages_table");
        assert_eq!(names[10], "m20250101_000011_seed_reference_data");
    }
}
