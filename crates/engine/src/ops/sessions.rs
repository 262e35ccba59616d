use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Session, sessions};

use super::{Engine, with_tx};

impl Engine {
    /// Open a session for `username` after a successful login.
    pub async fn open_session(&self, username: &str) -> ResultEngine<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            username: username.to_string(),
            greeting_shown: false,
            created_at: Utc::now(),
        };
        with_tx!(self, |db_tx| {
            if !self.user_exists(&db_tx, username).await? {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }
            sessions::ActiveModel::from(&session).insert(&db_tx).await?;
            tracing::debug!(user = username, session = %session.id, "session opened");
            Ok(session)
        })
    }

    /// Return `true` the first time it is called for a session, `false` after.
    pub async fn take_greeting(&self, session_id: Uuid, username: &str) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let model = self.require_session(&db_tx, session_id, username).await?;
            if model.greeting_shown {
                Ok(false)
            } else {
                let mut active: sessions::ActiveModel = model.into();
                active.greeting_shown = ActiveValue::Set(true);
                active.update(&db_tx).await?;
                Ok(true)
            }
        })
    }

    /// Remove a session on logout.
    pub async fn close_session(&self, session_id: Uuid, username: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_session(&db_tx, session_id, username).await?;
            sessions::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            tracing::debug!(user = username, session = %session_id, "session closed");
            Ok(())
        })
    }

    async fn require_session(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
        username: &str,
    ) -> ResultEngine<sessions::Model> {
        sessions::Entity::find_by_id(session_id.to_string())
            .one(db)
            .await?
            .filter(|model| model.username == username)
            .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))
    }
}
