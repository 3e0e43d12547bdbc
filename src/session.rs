use std::{error::Error, sync::Arc};

use teloxide::{dispatching::dialogue::Storage, types::ChatId};
use thiserror::Error;

use crate::state::{QuizState, Session, SessionPatch};

#[derive(Debug, Error)]
#[error("session storage failed: {0}")]
pub struct SessionError(#[source] Box<dyn Error + Send + Sync>);

/// Per-user session access. Every call touches a single user's entry only.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn get_state(&self, user: ChatId) -> Result<QuizState, SessionError>;

    async fn set_state(&self, user: ChatId, state: QuizState) -> Result<(), SessionError>;

    async fn get(&self, user: ChatId) -> Result<Option<Session>, SessionError> {
        Ok(self.get_state(user).await?.session().cloned())
    }

    async fn set(&self, user: ChatId, patch: SessionPatch) -> Result<(), SessionError> {
        let state = self.get_state(user).await?;
        self.set_state(user, state.patched(patch)).await
    }
}

impl<S> SessionStore for Arc<S>
where
    S: Storage<QuizState> + Send + Sync + ?Sized,
    S::Error: Error + Send + Sync + 'static,
{
    async fn get_state(&self, user: ChatId) -> Result<QuizState, SessionError> {
        let state = Arc::clone(self)
            .get_dialogue(user)
            .await
            .map_err(|e| SessionError(Box::new(e)))?;
        Ok(state.unwrap_or_default())
    }

    async fn set_state(&self, user: ChatId, state: QuizState) -> Result<(), SessionError> {
        Arc::clone(self)
            .update_dialogue(user, state)
            .await
            .map_err(|e| SessionError(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use teloxide::dispatching::dialogue::InMemStorage;

    use super::*;
    use crate::bank::ExamType;

    #[tokio::test]
    async fn unknown_user_is_idle() {
        let store = InMemStorage::<QuizState>::new();

        assert_eq!(store.get_state(ChatId(1)).await.unwrap(), QuizState::Idle);
        assert_eq!(store.get(ChatId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sessions_are_disjoint_per_user() {
        let store = InMemStorage::<QuizState>::new();
        let mut session = Session::new(Some(ExamType::Ege), 1);
        session.record_answer("42");

        store
            .set_state(ChatId(1), QuizState::Solving(session.clone()))
            .await
            .unwrap();
        store
            .set_state(ChatId(2), QuizState::ChoosingExamType)
            .await
            .unwrap();

        assert_eq!(store.get(ChatId(1)).await.unwrap(), Some(session));
        assert_eq!(
            store.get_state(ChatId(2)).await.unwrap(),
            QuizState::ChoosingExamType
        );
    }

    #[tokio::test]
    async fn set_patches_the_stored_session() {
        let store = InMemStorage::<QuizState>::new();
        store
            .set_state(ChatId(7), QuizState::ConfirmingStop(Session::new(None, 0)))
            .await
            .unwrap();

        store
            .set(
                ChatId(7),
                SessionPatch {
                    variant_index: Some(2),
                    answers: Some(vec!["a".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let state = store.get_state(ChatId(7)).await.unwrap();
        assert!(matches!(state, QuizState::ConfirmingStop(_)));
        let session = state.session().unwrap();
        assert_eq!(session.variant_index(), 2);
        assert_eq!(session.task_index(), 1);
    }
}
