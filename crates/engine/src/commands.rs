//! Command structs for engine write operations.
//!
//! Fields carry raw user input (dates as `YYYY-MM-DD`, amounts as decimal
//! strings); the engine validates them before touching the store.

use uuid::Uuid;

use crate::{EntryKind, Role};

/// Record a new income or expense owned by `user_id`.
#[derive(Clone, Debug)]
pub struct CreateEntryCmd {
    pub kind: EntryKind,
    pub user_id: String,
    pub date: String,
    pub description: String,
    pub mode: String,
    pub amount: String,
}

impl CreateEntryCmd {
    #[must_use]
    pub fn new(
        kind: EntryKind,
        user_id: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        mode: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            user_id: user_id.into(),
            date: date.into(),
            description: description.into(),
            mode: mode.into(),
            amount: amount.into(),
        }
    }
}

/// Change some fields of an entry owned by `user_id`. `None` leaves the
/// stored value untouched.
#[derive(Clone, Debug)]
pub struct UpdateEntryCmd {
    pub kind: EntryKind,
    pub id: Uuid,
    pub user_id: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub mode: Option<String>,
    pub amount: Option<String>,
}

impl UpdateEntryCmd {
    #[must_use]
    pub fn new(kind: EntryKind, id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            user_id: user_id.into(),
            date: None,
            description: None,
            mode: None,
            amount: None,
        }
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.description.is_none()
            && self.mode.is_none()
            && self.amount.is_none()
    }
}

/// Create a login together with its profile.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
            name: None,
            email: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
