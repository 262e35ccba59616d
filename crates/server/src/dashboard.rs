//! Dashboard endpoint

use api_types::{
    Role as ApiRole,
    dashboard::{Dashboard, DashboardQuery, RecentTransaction},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use engine::{ModeTotal, Role, Summary, User};

use crate::{ServerError, entries::map_kind, server::ServerState};

fn parse_as_of(value: Option<&str>) -> Result<NaiveDate, ServerError> {
    match value {
        None => Ok(Local::now().date_naive()),
        Some(raw) => Ok(engine::parse_date(raw)?),
    }
}

fn split_modes(modes: &[ModeTotal]) -> (Vec<String>, Vec<i64>) {
    modes
        .iter()
        .map(|mode| (mode.label.clone(), mode.total.minor()))
        .unzip()
}

fn to_dashboard(role: Role, summary: Summary) -> Dashboard {
    let (income_mode_labels, income_mode_values_minor) = split_modes(&summary.income_modes);
    let (expense_mode_labels, expense_mode_values_minor) = split_modes(&summary.expense_modes);

    Dashboard {
        role: match role {
            Role::Owner => ApiRole::Owner,
            Role::Staff => ApiRole::Staff,
        },
        is_owner: role == Role::Owner,
        total_income_minor: summary.total_income.minor(),
        total_expense_minor: summary.total_expense.minor(),
        balance_minor: summary.balance.minor(),
        transaction_count: summary.transaction_count as u64,
        recent_transactions: summary
            .recent
            .into_iter()
            .map(|item| RecentTransaction {
                id: item.id,
                date: item.date,
                description: item.description,
                amount_minor: item.amount.minor(),
                kind: map_kind(item.kind),
            })
            .collect(),
        month_labels: summary.months.iter().map(|m| m.label.clone()).collect(),
        income_values_minor: summary.months.iter().map(|m| m.income.minor()).collect(),
        expense_values_minor: summary.months.iter().map(|m| m.expense.minor()).collect(),
        income_mode_labels,
        income_mode_values_minor,
        expense_mode_labels,
        expense_mode_values_minor,
    }
}

/// Totals, recent activity and chart series for the requester's scope.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, ServerError> {
    let as_of = parse_as_of(query.as_of.as_deref())?;
    let (scope, summary) = state.engine.dashboard(&user.username, as_of).await?;
    Ok(Json(to_dashboard(scope.role(), summary)))
}
