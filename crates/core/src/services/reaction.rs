//! Reaction service.

use jokebot_common::AppResult;
use jokebot_db::entities::reaction;
use jokebot_db::repositories::{
    JokeReactionRepository, JokeRepository, ReactionCount, ReactionOutcome, ReactionRepository,
};

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    joke_reaction_repo: JokeReactionRepository,
    reaction_repo: ReactionRepository,
    joke_repo: JokeRepository,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        joke_reaction_repo: JokeReactionRepository,
        reaction_repo: ReactionRepository,
        joke_repo: JokeRepository,
    ) -> Self {
        Self {
            joke_reaction_repo,
            reaction_repo,
            joke_repo,
        }
    }

    /// The reactions users can pick from.
    pub async fn catalog(&self) -> AppResult<Vec<reaction::Model>> {
        self.reaction_repo.find_all().await
    }

    /// React to a joke.
    ///
    /// Repeating the current reaction removes it; picking another one
    /// replaces it.
    pub async fn react(
        &self,
        user_id: i64,
        joke_id: i32,
        reaction_id: i32,
    ) -> AppResult<ReactionOutcome> {
        self.reaction_repo.get_by_id(reaction_id).await?;
        self.joke_repo.get_by_id(joke_id).await?;

        self.joke_reaction_repo
            .toggle(user_id, joke_id, reaction_id)
            .await
    }

    /// Per-reaction counts for a joke.
    pub async fn counts(&self, joke_id: i32) -> AppResult<Vec<ReactionCount>> {
        self.joke_reaction_repo.counts_for_joke(joke_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jokebot_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_react_with_unknown_reaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reaction::Model>::new()])
                .into_connection(),
        );

        let service = ReactionService::new(
            JokeReactionRepository::new(Arc::clone(&db)),
            ReactionRepository::new(Arc::clone(&db)),
            JokeRepository::new(db),
        );
        let result = service.react(1, 1, 42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
