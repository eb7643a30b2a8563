//! Joke reaction repository.

use std::collections::HashMap;
use std::sync::Arc;

use super::now;
use crate::entities::{JokeReaction, Reaction, joke_reaction, reaction};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

const REACTION_CONFLICT: &str = "user already reacted to this joke";
const REACTION_REFERENCE: &str = "user, joke or reaction not found";

/// What a reaction toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionOutcome {
    /// The user had not reacted; the reaction was stored.
    Added,
    /// The user repeated their reaction; it was removed.
    Removed,
    /// The user picked another reaction; it replaced the old one.
    Changed,
}

/// Number of users who gave a reaction to a joke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionCount {
    pub reaction: reaction::Model,
    pub count: u64,
}

async fn insert_reaction<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    joke_id: i32,
    reaction_id: i32,
) -> AppResult<joke_reaction::Model> {
    let now = now();
    let model = joke_reaction::ActiveModel {
        user_id: Set(user_id),
        joke_id: Set(joke_id),
        reaction_id: Set(reaction_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| map_db_err_as(e, REACTION_CONFLICT, REACTION_REFERENCE))
}

/// Joke reaction repository for database operations.
#[derive(Clone)]
pub struct JokeReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl JokeReactionRepository {
    /// Create a new joke reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the reaction a user gave to a joke.
    pub async fn find_by_user_and_joke(
        &self,
        user_id: i64,
        joke_id: i32,
    ) -> AppResult<Option<joke_reaction::Model>> {
        JokeReaction::find()
            .filter(joke_reaction::Column::UserId.eq(user_id))
            .filter(joke_reaction::Column::JokeId.eq(joke_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Record a user's reaction to a joke.
    ///
    /// A second reaction by the same user to the same joke is rejected with
    /// `Conflict("user already reacted to this joke")`.
    pub async fn create(
        &self,
        user_id: i64,
        joke_id: i32,
        reaction_id: i32,
    ) -> AppResult<joke_reaction::Model> {
        insert_reaction(self.db.as_ref(), user_id, joke_id, reaction_id).await
    }

    /// Replace the reaction of an existing row.
    pub async fn change_reaction(
        &self,
        id: i32,
        reaction_id: i32,
    ) -> AppResult<joke_reaction::Model> {
        let existing = JokeReaction::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Joke reaction not found: {id}")))?;

        let mut model: joke_reaction::ActiveModel = existing.into();
        model.reaction_id = Set(reaction_id);
        model.updated_at = Set(now());
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, REACTION_CONFLICT, REACTION_REFERENCE))
    }

    /// Delete a joke reaction by ID.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = JokeReaction::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Apply a reaction with toggle semantics, in one transaction.
    ///
    /// No prior reaction inserts it, the same reaction removes it, and a
    /// different one replaces it in place.
    pub async fn toggle(
        &self,
        user_id: i64,
        joke_id: i32,
        reaction_id: i32,
    ) -> AppResult<ReactionOutcome> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = JokeReaction::find()
            .filter(joke_reaction::Column::UserId.eq(user_id))
            .filter(joke_reaction::Column::JokeId.eq(joke_id))
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let outcome = match existing {
            None => {
                insert_reaction(&txn, user_id, joke_id, reaction_id).await?;
                ReactionOutcome::Added
            }
            Some(row) if row.reaction_id == reaction_id => {
                JokeReaction::delete_by_id(row.id)
                    .exec(&txn)
                    .await
                    .map_err(map_db_err)?;
                ReactionOutcome::Removed
            }
            Some(row) => {
                let mut model: joke_reaction::ActiveModel = row.into();
                model.reaction_id = Set(reaction_id);
                model.updated_at = Set(now());
                model
                    .update(&txn)
                    .await
                    .map_err(|e| map_db_err_as(e, REACTION_CONFLICT, REACTION_REFERENCE))?;
                ReactionOutcome::Changed
            }
        };

        txn.commit().await.map_err(map_db_err)?;

        debug!(user_id, joke_id, reaction_id, outcome = ?outcome, "Toggled reaction");
        Ok(outcome)
    }

    /// Count every stored joke reaction.
    pub async fn count(&self) -> AppResult<u64> {
        JokeReaction::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Per-reaction counts for a joke. Every catalog reaction is listed,
    /// with a count of 0 when nobody gave it.
    pub async fn counts_for_joke(&self, joke_id: i32) -> AppResult<Vec<ReactionCount>> {
        let catalog = Reaction::find()
            .order_by_desc(reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let grouped: HashMap<i32, i64> = JokeReaction::find()
            .select_only()
            .column(joke_reaction::Column::ReactionId)
            .column_as(joke_reaction::Column::Id.count(), "total")
            .filter(joke_reaction::Column::JokeId.eq(joke_id))
            .group_by(joke_reaction::Column::ReactionId)
            .into_tuple::<(i32, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        Ok(catalog
            .into_iter()
            .map(|reaction| {
                let count = grouped.get(&reaction.id).copied().unwrap_or(0).max(0) as u64;
                ReactionCount { reaction, count }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_joke_reaction(id: i32, reaction_id: i32) -> joke_reaction::Model {
        joke_reaction::Model {
            id,
            user_id: 6_038_394_083,
            joke_id: 1,
            reaction_id,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_toggle_adds_when_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<joke_reaction::Model>::new()])
                .append_query_results([[create_test_joke_reaction(1, 1)]])
                .into_connection(),
        );

        let repo = JokeReactionRepository::new(db);
        let outcome = repo.toggle(6_038_394_083, 1, 1).await.unwrap();

        assert_eq!(outcome, ReactionOutcome::Added);
    }

    #[tokio::test]
    async fn test_toggle_removes_same_reaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_joke_reaction(1, 1)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = JokeReactionRepository::new(db);
        let outcome = repo.toggle(6_038_394_083, 1, 1).await.unwrap();

        assert_eq!(outcome, ReactionOutcome::Removed);
    }

    #[tokio::test]
    async fn test_toggle_changes_other_reaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_joke_reaction(1, 1)]])
                .append_query_results([[create_test_joke_reaction(1, -1)]])
                .into_connection(),
        );

        let repo = JokeReactionRepository::new(db);
        let outcome = repo.toggle(6_038_394_083, 1, -1).await.unwrap();

        assert_eq!(outcome, ReactionOutcome::Changed);
    }

    #[tokio::test]
    async fn test_counts_include_zero_rows() {
        let catalog = vec![
            reaction::Model {
                id: 1,
                name: "laughing".to_string(),
                emoji: "😂".to_string(),
            },
            reaction::Model {
                id: 0,
                name: "thinking".to_string(),
                emoji: "🤔".to_string(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([catalog])
                .append_query_results([[maplit::btreemap! {
                    "reaction_id" => sea_orm::Value::Int(Some(1)),
                    "total" => sea_orm::Value::BigInt(Some(2)),
                }]])
                .into_connection(),
        );

        let repo = JokeReactionRepository::new(db);
        let counts = repo.counts_for_joke(1).await.unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].reaction.name, "laughing");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 0);
    }
}
