//! The module contains the `LedgerEntry` type, one dated income or expense
//! owned by a user, and its `ledger_entries` table.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Plural form used for export file names (`expenses_2025-01-31.pdf`).
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expenses",
        }
    }

    /// Human title used for sheet names and report headings.
    pub fn title(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expenses",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

/// One dated money movement recorded by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub owner: String,
    pub date: NaiveDate,
    pub description: String,
    pub mode: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build a fresh entry stamped with `now` for both audit timestamps.
    pub fn new(
        kind: EntryKind,
        owner: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        mode: impl Into<String>,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            owner: owner.into(),
            date,
            description: description.into(),
            mode: mode.into(),
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub kind: String,
    pub date: Date,
    pub description: String,
    pub mode: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            owner: ActiveValue::Set(entry.owner.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            date: ActiveValue::Set(entry.date),
            description: ActiveValue::Set(entry.description.clone()),
            mode: ActiveValue::Set(entry.mode.clone()),
            amount_minor: ActiveValue::Set(entry.amount.minor()),
            created_at: ActiveValue::Set(entry.created_at),
            updated_at: ActiveValue::Set(entry.updated_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "entry")?,
            kind: EntryKind::try_from(model.kind.as_str())?,
            owner: model.owner,
            date: model.date,
            description: model.description,
            mode: model.mode,
            amount: Money::new(model.amount_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
