//! Sample data for development and tests.
//!
//! Requires the reference data (languages and reactions) to be present.

use crate::entities::{
    Joke, JokeReaction, JokeTag, Reaction, Tag, User, joke, joke_reaction, joke_tag, tag, user,
};
use crate::error::{map_db_err, map_db_err_as};
use crate::seed::{LAUGHING, THINKING};
use jokebot_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

/// The sample user that owns every sample joke.
pub const SAMPLE_USER_ID: i64 = 6_038_394_083;

/// Sample tags.
pub const SAMPLE_TAGS: [&str; 4] = ["Funny", "Puns", "Programming", "Dad Jokes"];

/// Content of the sample joke tagged "Funny" with one laughing reaction.
pub const SKELETON_JOKE: &str =
    "Why don't skeletons fight each other? They don't have the guts.";

/// Sample jokes: `(content, tags, reaction of the sample user)`.
const SAMPLE_JOKES: [(&str, &[&str], Option<i32>); 3] = [
    (SKELETON_JOKE, &["Funny"], Some(LAUGHING)),
    (
        "I'm reading a book about anti-gravity. It's impossible to put down.",
        &["Puns", "Dad Jokes"],
        Some(THINKING),
    ),
    (
        "Why do programmers prefer dark mode? Because light attracts bugs.",
        &["Programming", "Puns"],
        None,
    ),
];

/// Rows inserted by [`load_sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureReport {
    pub users: usize,
    pub tags: usize,
    pub jokes: usize,
    pub joke_tags: usize,
    pub joke_reactions: usize,
}

/// Insert the sample user, tags, jokes and reactions in one transaction.
///
/// Does nothing when the sample jokes are already there.
pub async fn load_sample_data(db: &DatabaseConnection) -> AppResult<FixtureReport> {
    let mut report = FixtureReport::default();

    if Reaction::find_by_id(LAUGHING)
        .one(db)
        .await
        .map_err(map_db_err)?
        .is_none()
    {
        return Err(AppError::InvalidReference(
            "reference data must be seeded before the sample data".to_string(),
        ));
    }

    if Joke::find()
        .filter(joke::Column::Content.eq(SKELETON_JOKE))
        .one(db)
        .await
        .map_err(map_db_err)?
        .is_some()
    {
        info!("Sample data already loaded");
        return Ok(report);
    }

    let txn = db.begin().await.map_err(map_db_err)?;
    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

    if User::find_by_id(SAMPLE_USER_ID)
        .one(&txn)
        .await
        .map_err(map_db_err)?
        .is_none()
    {
        user::ActiveModel {
            id: Set(SAMPLE_USER_ID),
            username: Set(Some("jokebot_sample".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;
        report.users += 1;
    }

    let mut tag_ids = Vec::with_capacity(SAMPLE_TAGS.len());
    for name in SAMPLE_TAGS {
        let existing = Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        let id = match existing {
            Some(tag) => tag.id,
            None => {
                let created = tag::ActiveModel {
                    name: Set(name.to_string()),
                    created_by: Set(Some(SAMPLE_USER_ID)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(map_db_err)?;
                report.tags += 1;
                created.id
            }
        };
        tag_ids.push((name, id));
    }

    for (content, tags, reaction) in SAMPLE_JOKES {
        let joke = joke::ActiveModel {
            add_by: Set(SAMPLE_USER_ID),
            language_code: Set("en".to_string()),
            content: Set(content.to_string()),
            status: Set(joke::JokeStatus::Published),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| map_db_err_as(e, "joke already exists", "author or language not found"))?;
        report.jokes += 1;

        for tag_name in tags {
            let Some(&(_, tag_id)) = tag_ids.iter().find(|(name, _)| name == tag_name) else {
                continue;
            };
            JokeTag::insert(joke_tag::ActiveModel {
                joke_id: Set(joke.id),
                tag_id: Set(tag_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
            report.joke_tags += 1;
        }

        if let Some(reaction_id) = reaction {
            JokeReaction::insert(joke_reaction::ActiveModel {
                user_id: Set(SAMPLE_USER_ID),
                joke_id: Set(joke.id),
                reaction_id: Set(reaction_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
            report.joke_reactions += 1;
        }
    }

    txn.commit().await.map_err(map_db_err)?;

    info!(
        users = report.users,
        tags = report.tags,
        jokes = report.jokes,
        joke_tags = report.joke_tags,
        joke_reactions = report.joke_reactions,
        "Sample data loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_jokes_use_known_tags() {
        for (_, tags, _) in SAMPLE_JOKES {
            for tag in tags {
                assert!(SAMPLE_TAGS.contains(tag), "unknown tag {tag}");
            }
        }
    }

    #[test]
    fn test_skeleton_joke_has_single_tag() {
        let (_, tags, reaction) = SAMPLE_JOKES[0];
        assert_eq!(tags, &["Funny"]);
        assert_eq!(reaction, Some(LAUGHING));
    }

    #[test]
    fn test_sample_jokes_are_long_enough() {
        for (content, _, _) in SAMPLE_JOKES {
            assert!(content.trim().chars().count() >= 30);
        }
    }
}
