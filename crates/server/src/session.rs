//! Login session endpoints

use api_types::session::{Greeting, SessionOpened};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn open(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<SessionOpened>), ServerError> {
    let session = state.engine.open_session(&user.username).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionOpened {
            id: session.id,
            username: session.username,
        }),
    ))
}

/// Report whether to greet the user, then remember that it happened.
pub async fn greeting(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Greeting>, ServerError> {
    let show = state.engine.take_greeting(id, &user.username).await?;
    Ok(Json(Greeting { show }))
}

pub async fn close(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.close_session(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
