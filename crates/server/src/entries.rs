//! Income and expense endpoints

use api_types::entry::{
    EntryCreated, EntryListQuery, EntryListResponse, EntryNew, EntryUpdate, EntryView,
    ModesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateEntryCmd, DateRange, EntryKind, LedgerEntry, UpdateEntryCmd, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn parse_kind(kind: &str) -> Result<EntryKind, ServerError> {
    EntryKind::try_from(kind).map_err(ServerError::from)
}

pub(crate) fn map_kind(kind: EntryKind) -> api_types::EntryKind {
    match kind {
        EntryKind::Income => api_types::EntryKind::Income,
        EntryKind::Expense => api_types::EntryKind::Expense,
    }
}

fn entry_view(entry: LedgerEntry) -> EntryView {
    EntryView {
        id: entry.id,
        kind: map_kind(entry.kind),
        owner: entry.owner,
        date: entry.date,
        description: entry.description,
        mode: entry.mode,
        amount_minor: entry.amount.minor(),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

/// List the entries of a kind visible to the requester, newest first.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let range = DateRange::parse(query.from.as_deref(), query.to.as_deref())?;
    let scope = state.engine.scope_for(&user.username).await?;
    let entries = state.engine.entries(kind, &scope, Some(range)).await?;

    Ok(Json(EntryListResponse {
        entries: entries.into_iter().map(entry_view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let kind = parse_kind(&kind)?;
    let id = state
        .engine
        .create_entry(CreateEntryCmd::new(
            kind,
            user.username,
            payload.date,
            payload.description,
            payload.mode,
            payload.amount,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id })))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<EntryView>, ServerError> {
    let kind = parse_kind(&kind)?;
    let scope = state.engine.scope_for(&user.username).await?;
    let entry = state.engine.entry(kind, id, &scope).await?;
    Ok(Json(entry_view(entry)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(payload): Json<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    let kind = parse_kind(&kind)?;
    let cmd = UpdateEntryCmd {
        kind,
        id,
        user_id: user.username,
        date: payload.date,
        description: payload.description,
        mode: payload.mode,
        amount: payload.amount,
    };
    let entry = state.engine.update_entry(cmd).await?;
    Ok(Json(entry_view(entry)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let kind = parse_kind(&kind)?;
    state.engine.delete_entry(kind, id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn modes(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<ModesResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(ModesResponse {
        kind: map_kind(kind),
        modes: state.engine.allowed_modes(kind).to_vec(),
    }))
}
