//! Request handlers for the `/api/users` endpoints.
//!
//! Each handler performs a single store operation; nothing is cached.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::error::Result;
use crate::user::{User, UserInput};

pub(crate) async fn create_user(
    State(state): State<AppState>,
    body: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(input) = body?;
    let user = state.with_storage(|storage| storage.create(&input))?;
    info!(id = %user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.with_storage(crate::storage::Storage::list)?;
    Ok(Json(users))
}

pub(crate) async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let user = state.with_storage(|storage| storage.get(&id))?;
    Ok(Json(user))
}

pub(crate) async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>> {
    // An unknown id is reported before a malformed body.
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            state.with_storage(|storage| storage.get(&id))?;
            return Err(rejection.into());
        }
    };
    let user = state.with_storage(|storage| storage.update(&id, &input))?;
    info!(id = %user.id, "Updated user");
    Ok(Json(user))
}

pub(crate) async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.with_storage(|storage| storage.delete(&id))?;
    info!(%id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
