use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{
    EngineError, Profile, RegisterUserCmd, ResultEngine, Scope, User, profiles, resolve_scope,
    users, util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Check Basic credentials against the `users` table.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::Unauthorized("missing credentials".to_string()));
        }
        let user = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        match user {
            Some(user) if user.password == password => Ok(User::from(user)),
            _ => Err(EngineError::Unauthorized("invalid credentials".to_string())),
        }
    }

    /// Return the profile of `username`, if one was ever created.
    pub async fn profile_of(&self, username: &str) -> ResultEngine<Option<Profile>> {
        profiles::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    /// Read scope of `username`, derived from its profile role.
    pub async fn scope_for(&self, username: &str) -> ResultEngine<Scope> {
        let profile = self.profile_of(username).await?;
        Ok(resolve_scope(username, profile.as_ref()))
    }

    /// Create a user and its profile in one transaction.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<Profile> {
        let username = cmd.username.trim().to_string();
        if username.is_empty() {
            return Err(EngineError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        if cmd.password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        let profile = Profile {
            username: username.clone(),
            role: cmd.role,
            name: normalize_optional_text(cmd.name.as_deref()),
            email: normalize_optional_text(cmd.email.as_deref()),
        };

        with_tx!(self, |db_tx| {
            if self.user_exists(&db_tx, &username).await? {
                return Err(EngineError::ExistingKey(username));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(cmd.password),
            }
            .insert(&db_tx)
            .await?;
            profiles::ActiveModel::from(&profile).insert(&db_tx).await?;
            tracing::info!(user = %username, role = profile.role.as_str(), "user registered");
            Ok(profile)
        })
    }

    pub(super) async fn user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some())
    }
}
