//! Report download endpoints

use axum::{
    Extension,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Local;
use engine::{ReportFormat, User};

use crate::{ServerError, entries::parse_kind, server::ServerState};

/// Serve the requester's scoped entries as an `.xlsx` or `.pdf` attachment.
pub async fn download(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((kind, format)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    let kind = parse_kind(&kind)?;
    let format = ReportFormat::try_from(format.as_str())?;
    let export = state
        .engine
        .export(&user.username, kind, format, Local::now().date_naive())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}
