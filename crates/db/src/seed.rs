//! Reference data: the reaction catalog and the language list.
//!
//! Applied once by the `m20250101_000011_seed_reference_data` migration.
//! Each row is only inserted when its key is missing, so running the seed
//! again (for example from the admin tool) leaves the tables unchanged.

use crate::entities::{Language, Reaction, language, reaction};
use crate::error::map_db_err;
use jokebot_common::AppResult;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use tracing::{debug, info};

/// Reaction catalog: `(id, name, emoji)`.
pub const REACTIONS: [(i32, &str, &str); 3] = [
    (1, "laughing", "😂"),
    (0, "thinking", "🤔"),
    (-1, "dislike", "👎"),
];

/// Supported languages: `(ISO 639-1 code, name)`.
pub const LANGUAGES: [(&str, &str); 12] = [
    ("en", "English"),
    ("ar", "Arabic"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fa", "Persian"),
    ("fr", "French"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("zh", "Chinese"),
];

/// Reaction id of "laughing".
pub const LAUGHING: i32 = 1;
/// Reaction id of "thinking".
pub const THINKING: i32 = 0;
/// Reaction id of "dislike".
pub const DISLIKE: i32 = -1;

/// Number of rows a seed run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub reactions_inserted: usize,
    pub languages_inserted: usize,
}

impl SeedReport {
    /// Whether the run changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.reactions_inserted == 0 && self.languages_inserted == 0
    }
}

/// Insert the missing reaction and language rows.
pub async fn seed_reference_data<C>(db: &C) -> AppResult<SeedReport>
where
    C: ConnectionTrait,
{
    let mut report = SeedReport::default();

    for (id, name, emoji) in REACTIONS {
        if Reaction::find_by_id(id)
            .one(db)
            .await
            .map_err(map_db_err)?
            .is_some()
        {
            continue;
        }

        let model = reaction::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            emoji: Set(emoji.to_string()),
        };
        Reaction::insert(model).exec(db).await.map_err(map_db_err)?;
        debug!(reaction_id = id, name, "Seeded reaction");
        report.reactions_inserted += 1;
    }

    for (code, name) in LANGUAGES {
        if Language::find_by_id(code)
            .one(db)
            .await
            .map_err(map_db_err)?
            .is_some()
        {
            continue;
        }

        let model = language::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
        };
        Language::insert(model).exec(db).await.map_err(map_db_err)?;
        debug!(code, name, "Seeded language");
        report.languages_inserted += 1;
    }

    info!(
        reactions = report.reactions_inserted,
        languages = report.languages_inserted,
        "Reference data seeded"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_reaction_catalog() {
        let ids: Vec<i32> = REACTIONS.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![LAUGHING, THINKING, DISLIKE]);
        assert_eq!(REACTIONS[0].1, "laughing");
        assert_eq!(REACTIONS[2].1, "dislike");
    }

    #[test]
    fn test_language_codes_are_unique() {
        let mut codes: Vec<&str> = LANGUAGES.iter().map(|l| l.0).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 12);
    }

    #[tokio::test]
    async fn test_seed_skips_existing_rows() {
        let reactions: Vec<Vec<reaction::Model>> = REACTIONS
            .iter()
            .map(|(id, name, emoji)| {
                vec![reaction::Model {
                    id: *id,
                    name: (*name).to_string(),
                    emoji: (*emoji).to_string(),
                }]
            })
            .collect();
        let languages: Vec<Vec<language::Model>> = LANGUAGES
            .iter()
            .map(|(code, name)| {
                vec![language::Model {
                    code: (*code).to_string(),
                    name: (*name).to_string(),
                }]
            })
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(reactions)
            .append_query_results(languages)
            .into_connection();

        let report = seed_reference_data(&db).await.unwrap();
        assert!(report.is_noop());
    }
}
