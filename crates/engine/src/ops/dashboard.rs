use chrono::NaiveDate;

use crate::{EntryKind, ResultEngine, Scope, Summary, summarize};

use super::Engine;

impl Engine {
    /// Summary of everything `username` may read, with the monthly series
    /// ending at `as_of`'s month.
    pub async fn dashboard(
        &self,
        username: &str,
        as_of: NaiveDate,
    ) -> ResultEngine<(Scope, Summary)> {
        let scope = self.scope_for(username).await?;
        let income = self.entries(EntryKind::Income, &scope, None).await?;
        let expense = self.entries(EntryKind::Expense, &scope, None).await?;
        tracing::debug!(
            user = username,
            income = income.len(),
            expense = expense.len(),
            "building dashboard"
        );
        let summary = summarize(&income, &expense, as_of);
        Ok((scope, summary))
    }
}
