//! Handlers for schedules and their membership.
//!
//! Every route here is authenticated; ownership checks live in the domain
//! services, not in the handlers.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use slate_core::{schedule::Schedule, store::TimetableStore};

use crate::{AppState, auth::Actor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// The owning user; must be the caller unless the caller is an admin.
  pub user_id: Uuid,
  pub name:    String,
}

/// `POST /schedules`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let schedule =
    state.schedules.create(&actor, body.user_id, &body.name).await?;
  Ok((StatusCode::CREATED, Json(schedule)))
}

/// `GET /schedules/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.schedules.get_by_id(&actor, id).await?))
}

/// `GET /schedules/user/:id`
pub async fn list_for_user<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Schedule>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.schedules.get_by_user(&actor, user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub name: String,
}

/// `PUT /schedules/:id/rename`
pub async fn rename<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<RenameBody>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  state.schedules.rename(&actor, id, &body.name).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /schedules/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  state.schedules.delete(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AddSubjectBody {
  pub subject_id: Uuid,
}

/// `POST /schedules/:id/subjects` — returns the updated schedule; a
/// time-slot collision comes back as 409 with the conflicting pairs.
pub async fn add_subject<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<AddSubjectBody>,
) -> Result<Json<Schedule>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let schedule =
    state.schedules.add_subject(&actor, id, body.subject_id).await?;
  Ok(Json(schedule))
}

/// `DELETE /schedules/:id/subjects/:subject_id`
pub async fn remove_subject<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path((id, subject_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Schedule>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let schedule =
    state.schedules.remove_subject(&actor, id, subject_id).await?;
  Ok(Json(schedule))
}
