use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, Select, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateEntryCmd, EngineError, EntryKind, LedgerEntry, Money, ResultEngine, Scope,
    UpdateEntryCmd, entry,
    util::{DESCRIPTION_MAX_CHARS, normalize_text, parse_date},
};

use super::{Engine, with_tx};

/// Inclusive date bounds for listings. Missing bounds are open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<Self> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(EngineError::Validation(format!(
                "date range starts after it ends: {from} > {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Parse optional `YYYY-MM-DD` bounds.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> ResultEngine<Self> {
        Self::new(
            from.map(parse_date).transpose()?,
            to.map(parse_date).transpose()?,
        )
    }
}

fn scoped(kind: EntryKind, scope: &Scope) -> Select<entry::Entity> {
    let query = entry::Entity::find().filter(entry::Column::Kind.eq(kind.as_str()));
    match scope {
        Scope::All => query,
        Scope::OwnedBy(owner) => query.filter(entry::Column::Owner.eq(owner.clone())),
    }
}

fn not_found() -> EngineError {
    EngineError::KeyNotFound("entry not exists".to_string())
}

impl Engine {
    /// Record a new entry owned by the requester and return its id.
    pub async fn create_entry(&self, cmd: CreateEntryCmd) -> ResultEngine<Uuid> {
        let date = parse_date(&cmd.date)?;
        let description = normalize_text(&cmd.description, "description", DESCRIPTION_MAX_CHARS)?;
        let mode = self.modes.validate(cmd.kind, &cmd.mode)?;
        let amount: Money = cmd.amount.parse()?;

        let new_entry = LedgerEntry::new(
            cmd.kind,
            &cmd.user_id,
            date,
            description,
            mode,
            amount,
            Utc::now(),
        );

        with_tx!(self, |db_tx| {
            if !self.user_exists(&db_tx, &cmd.user_id).await? {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }
            entry::ActiveModel::from(&new_entry).insert(&db_tx).await?;
            tracing::info!(
                id = %new_entry.id,
                kind = new_entry.kind.as_str(),
                owner = %new_entry.owner,
                amount = %new_entry.amount,
                "entry created"
            );
            Ok(new_entry.id)
        })
    }

    /// Change the present fields of an entry the requester owns.
    ///
    /// Ownership is checked regardless of role, so an `owner` cannot edit
    /// someone else's entry either.
    pub async fn update_entry(&self, cmd: UpdateEntryCmd) -> ResultEngine<LedgerEntry> {
        let date = cmd.date.as_deref().map(parse_date).transpose()?;
        let description = cmd
            .description
            .as_deref()
            .map(|d| normalize_text(d, "description", DESCRIPTION_MAX_CHARS))
            .transpose()?;
        let mode = cmd
            .mode
            .as_deref()
            .map(|m| self.modes.validate(cmd.kind, m))
            .transpose()?;
        let amount = cmd.amount.as_deref().map(str::parse::<Money>).transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_own_entry(&db_tx, cmd.kind, cmd.id, &cmd.user_id)
                .await?;
            if cmd.is_empty() {
                LedgerEntry::try_from(model)
            } else {
                let mut active: entry::ActiveModel = model.into();
                if let Some(date) = date {
                    active.date = ActiveValue::Set(date);
                }
                if let Some(description) = description {
                    active.description = ActiveValue::Set(description);
                }
                if let Some(mode) = mode {
                    active.mode = ActiveValue::Set(mode);
                }
                if let Some(amount) = amount {
                    active.amount_minor = ActiveValue::Set(amount.minor());
                }
                active.updated_at = ActiveValue::Set(Utc::now());
                let updated = active.update(&db_tx).await?;
                tracing::info!(id = %cmd.id, kind = cmd.kind.as_str(), "entry updated");
                LedgerEntry::try_from(updated)
            }
        })
    }

    /// Permanently remove an entry the requester owns.
    pub async fn delete_entry(&self, kind: EntryKind, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_own_entry(&db_tx, kind, id, user_id).await?;
            entry::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            tracing::info!(id = %id, kind = kind.as_str(), owner = user_id, "entry deleted");
            Ok(())
        })
    }

    /// Fetch one entry visible in `scope`.
    pub async fn entry(
        &self,
        kind: EntryKind,
        id: Uuid,
        scope: &Scope,
    ) -> ResultEngine<LedgerEntry> {
        let model = scoped(kind, scope)
            .filter(entry::Column::Id.eq(id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(not_found)?;
        LedgerEntry::try_from(model)
    }

    /// Entries of `kind` visible in `scope`, newest first.
    pub async fn entries(
        &self,
        kind: EntryKind,
        scope: &Scope,
        range: Option<DateRange>,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let mut query = scoped(kind, scope);
        if let Some(range) = range {
            if let Some(from) = range.from {
                query = query.filter(entry::Column::Date.gte(from));
            }
            if let Some(to) = range.to {
                query = query.filter(entry::Column::Date.lte(to));
            }
        }

        query
            .order_by_desc(entry::Column::Date)
            .order_by_desc(entry::Column::CreatedAt)
            .order_by_desc(entry::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }

    /// Modes accepted for `kind`.
    pub fn allowed_modes(&self, kind: EntryKind) -> &[String] {
        self.modes.allowed(kind)
    }

    async fn require_own_entry(
        &self,
        db: &DatabaseTransaction,
        kind: EntryKind,
        id: Uuid,
        user_id: &str,
    ) -> ResultEngine<entry::Model> {
        scoped(kind, &Scope::OwnedBy(user_id.to_string()))
            .filter(entry::Column::Id.eq(id.to_string()))
            .one(db)
            .await?
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_parses_optional_bounds() {
        let range = DateRange::parse(Some("2025-01-01"), Some(" 2025-01-31 ")).unwrap();
        assert_eq!(range.from, Some(date(2025, 1, 1)));
        assert_eq!(range.to, Some(date(2025, 1, 31)));
        assert_eq!(DateRange::parse(None, None).unwrap(), DateRange::default());
        assert!(DateRange::parse(Some("2025-01-31"), Some("2025-01-31")).is_ok());
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        assert!(matches!(
            DateRange::parse(Some("2025-02-01"), Some("2025-01-01")),
            Err(EngineError::Validation(_))
        ));
        assert!(DateRange::parse(Some("yesterday"), None).is_err());
    }
}
