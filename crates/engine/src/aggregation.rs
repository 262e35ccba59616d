//! Dashboard aggregation.
//!
//! Everything here is pure: it receives the already scoped income and expense
//! entries and never fails.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EntryKind, LedgerEntry, Money};

/// Entries taken from each kind before merging the recent feed.
pub const RECENT_PER_KIND: usize = 10;
/// Length of the merged recent feed.
pub const RECENT_LIMIT: usize = 5;
/// Number of calendar months in the trend series.
pub const MONTH_WINDOW: usize = 6;

const UNKNOWN_MODE: &str = "Unknown";
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItem {
    pub id: Uuid,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// `"Mon YYYY"`, e.g. `"Jan 2025"`.
    pub label: String,
    pub income: Money,
    pub expense: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTotal {
    pub label: String,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Money,
    pub total_expense: Money,
    pub balance: Money,
    pub transaction_count: usize,
    pub recent: Vec<RecentItem>,
    pub months: Vec<MonthBucket>,
    pub income_modes: Vec<ModeTotal>,
    pub expense_modes: Vec<ModeTotal>,
}

/// Build the dashboard summary for a scoped entry set.
///
/// `as_of` selects the last month of the trend series.
pub fn summarize(income: &[LedgerEntry], expense: &[LedgerEntry], as_of: NaiveDate) -> Summary {
    let total_income: Money = income.iter().map(|e| e.amount).sum();
    let total_expense: Money = expense.iter().map(|e| e.amount).sum();

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: income.len() + expense.len(),
        recent: recent_activity(income, expense),
        months: monthly_series(income, expense, as_of),
        income_modes: mode_breakdown(income),
        expense_modes: mode_breakdown(expense),
    }
}

/// Newest entries of both kinds, at most [`RECENT_LIMIT`].
///
/// Each kind contributes its [`RECENT_PER_KIND`] newest entries (date, then
/// creation time, then id, all descending). Expenses are merged before incomes
/// and the merged list is stably sorted by date, so on equal dates expenses
/// come first.
pub fn recent_activity(income: &[LedgerEntry], expense: &[LedgerEntry]) -> Vec<RecentItem> {
    let mut merged: Vec<RecentItem> = newest(expense)
        .into_iter()
        .chain(newest(income))
        .map(|entry| RecentItem {
            id: entry.id,
            kind: entry.kind,
            date: entry.date,
            description: entry.description.clone(),
            amount: entry.amount,
        })
        .collect();

    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged.truncate(RECENT_LIMIT);
    merged
}

fn newest(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let mut sorted: Vec<&LedgerEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
    sorted.truncate(RECENT_PER_KIND);
    sorted
}

/// Income and expense totals for the [`MONTH_WINDOW`] calendar months ending
/// with `as_of`'s month, oldest first. Months without entries report zero.
pub fn monthly_series(
    income: &[LedgerEntry],
    expense: &[LedgerEntry],
    as_of: NaiveDate,
) -> Vec<MonthBucket> {
    let end = month_index(as_of);
    let start = end - (MONTH_WINDOW as i64 - 1);

    let mut buckets: Vec<MonthBucket> = (start..=end)
        .map(|idx| {
            let year = idx.div_euclid(12) as i32;
            let month0 = idx.rem_euclid(12) as usize;
            MonthBucket {
                year,
                month: month0 as u32 + 1,
                label: format!("{} {year}", MONTH_ABBREVIATIONS[month0]),
                income: Money::ZERO,
                expense: Money::ZERO,
            }
        })
        .collect();

    let slot = |date: NaiveDate| -> Option<usize> {
        let idx = month_index(date);
        (start..=end).contains(&idx).then(|| (idx - start) as usize)
    };

    for entry in income {
        if let Some(i) = slot(entry.date) {
            buckets[i].income += entry.amount;
        }
    }
    for entry in expense {
        if let Some(i) = slot(entry.date) {
            buckets[i].expense += entry.amount;
        }
    }

    buckets
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Totals grouped by mode, largest first; ties are ordered by label.
/// A blank mode is reported as `"Unknown"`.
pub fn mode_breakdown(entries: &[LedgerEntry]) -> Vec<ModeTotal> {
    let mut groups: BTreeMap<&str, Money> = BTreeMap::new();
    for entry in entries {
        let label = match entry.mode.trim() {
            "" => UNKNOWN_MODE,
            mode => mode,
        };
        *groups.entry(label).or_default() += entry.amount;
    }

    let mut totals: Vec<ModeTotal> = groups
        .into_iter()
        .map(|(label, total)| ModeTotal {
            label: label.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    totals
}
