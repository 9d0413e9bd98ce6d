//! Handlers for the subject catalog.
//!
//! Reads are open; writes require the admin capability. Payload shapes are
//! validated here, once, before anything reaches the domain.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use slate_core::{
  class::{Class, TimeBlock, Weekday},
  store::TimetableStore,
  subject::{NewSubject, Subject},
};

use crate::{AppState, auth::Actor, error::ApiError};

// ─── Typed input ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassBody {
  /// 1 = Monday … 5 = Friday.
  pub day:       u8,
  /// 1 = 08:00 … 6 = 21:00.
  pub block:     u8,
  pub classroom: u32,
}

#[derive(Debug, Deserialize)]
pub struct SubjectBody {
  pub name:       String,
  pub instructor: String,
  pub classes:    Vec<ClassBody>,
}

impl SubjectBody {
  fn into_domain(self) -> Result<NewSubject, ApiError> {
    if self.name.trim().is_empty() {
      return Err(ApiError::BadRequest("name must not be empty".into()));
    }
    if self.instructor.trim().is_empty() {
      return Err(ApiError::BadRequest("instructor must not be empty".into()));
    }
    if self.classes.is_empty() {
      return Err(ApiError::BadRequest(
        "a subject needs at least one class".into(),
      ));
    }

    let classes = self
      .classes
      .into_iter()
      .map(|c| {
        Ok(Class {
          day:       parse_day(c.day)?,
          block:     parse_block(c.block)?,
          classroom: c.classroom,
        })
      })
      .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(NewSubject::new(self.name, self.instructor, classes))
  }
}

fn parse_day(i: u8) -> Result<Weekday, ApiError> {
  Weekday::from_index(i)
    .ok_or_else(|| ApiError::BadRequest(format!("day {i} out of range 1-5")))
}

fn parse_block(i: u8) -> Result<TimeBlock, ApiError> {
  TimeBlock::from_index(i)
    .ok_or_else(|| ApiError::BadRequest(format!("block {i} out of range 1-6")))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /subjects`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_all().await?))
}

/// `GET /subjects/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_id(id).await?))
}

/// `GET /subjects/name/:name`
pub async fn get_by_name<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Subject>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_name(&name).await?))
}

/// `GET /subjects/instructor/:instructor`
pub async fn list_by_instructor<S>(
  State(state): State<AppState<S>>,
  Path(instructor): Path<String>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_instructor(&instructor).await?))
}

/// `GET /subjects/day/:day`
pub async fn list_by_day<S>(
  State(state): State<AppState<S>>,
  Path(day): Path<u8>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_day(parse_day(day)?).await?))
}

/// `GET /subjects/block/:block`
pub async fn list_by_block<S>(
  State(state): State<AppState<S>>,
  Path(block): Path<u8>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_block(parse_block(block)?).await?))
}

/// `GET /subjects/classroom/:room`
pub async fn list_by_classroom<S>(
  State(state): State<AppState<S>>,
  Path(room): Path<u32>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.subjects.get_by_classroom(room).await?))
}

// ─── Writes (admin) ──────────────────────────────────────────────────────────

/// `POST /subjects`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<SubjectBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let subject = state.subjects.create(&actor, body.into_domain()?).await?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `PUT /subjects/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<SubjectBody>,
) -> Result<Json<Subject>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let subject =
    state.subjects.update(&actor, id, body.into_domain()?).await?;
  Ok(Json(subject))
}

/// `DELETE /subjects/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  state.subjects.delete(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
