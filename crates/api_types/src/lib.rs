use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Staff,
}

pub mod entry {
    use super::*;

    /// Request body for recording an entry.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        /// `YYYY-MM-DD`.
        pub date: String,
        pub description: String,
        pub mode: String,
        /// Decimal string with at most 2 fractional digits, e.g. `"1250.50"`.
        pub amount: String,
    }

    /// Partial update; absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub date: Option<String>,
        pub description: Option<String>,
        pub mode: Option<String>,
        pub amount: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub kind: EntryKind,
        pub owner: String,
        pub date: NaiveDate,
        pub description: String,
        pub mode: String,
        pub amount_minor: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Optional inclusive bounds, `YYYY-MM-DD`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryListQuery {
        pub from: Option<String>,
        pub to: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ModesResponse {
        pub kind: EntryKind,
        pub modes: Vec<String>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DashboardQuery {
        /// Last month of the trend series, `YYYY-MM-DD`; defaults to today.
        pub as_of: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentTransaction {
        pub id: Uuid,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        #[serde(rename = "type")]
        pub kind: EntryKind,
    }

    /// Everything the dashboard page renders. Money is in minor units and
    /// the chart series are parallel arrays.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub role: Role,
        pub is_owner: bool,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub balance_minor: i64,
        pub transaction_count: u64,
        pub recent_transactions: Vec<RecentTransaction>,
        pub month_labels: Vec<String>,
        pub income_values_minor: Vec<i64>,
        pub expense_values_minor: Vec<i64>,
        pub income_mode_labels: Vec<String>,
        pub income_mode_values_minor: Vec<i64>,
        pub expense_mode_labels: Vec<String>,
        pub expense_mode_values_minor: Vec<i64>,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionOpened {
        pub id: Uuid,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Greeting {
        /// `true` only the first time it is asked for within a session.
        pub show: bool,
    }
}
