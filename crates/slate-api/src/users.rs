//! Handlers for registration, login, and account management.
//!
//! | Method   | Path                    | Notes                      |
//! |----------|-------------------------|----------------------------|
//! | `POST`   | `/register`             | Open                       |
//! | `POST`   | `/login`                | Open; returns a token      |
//! | `GET`    | `/users/me`             | Authenticated              |
//! | `PUT`    | `/users/:id/username`   | Owner or admin             |
//! | `PUT`    | `/users/:id/password`   | Owner or admin             |
//! | `DELETE` | `/users/:id`            | Admin                      |
//! | `GET`    | `/users`                | Admin                      |
//! | `GET`    | `/users/with-schedules` | Admin                      |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use slate_core::{
  auth::{Identity, TokenIssuer as _},
  store::TimetableStore,
  user::{UserProfile, UserWithSchedules},
};

use crate::{AppState, auth::Actor, error::ApiError};

fn require_nonempty(value: &str, field: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{field} must not be empty")));
  }
  Ok(())
}

// ─── Register / login ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub username: String,
  pub password: String,
}

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  require_nonempty(&body.username, "username")?;
  require_nonempty(&body.password, "password")?;

  let profile = state.users.register(&body.username, &body.password).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  UserProfile,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let profile = state.users.login(&body.username, &body.password).await?;
  let token = state.tokens.sign(&Identity {
    user_id:  profile.user_id,
    is_admin: profile.is_admin,
  })?;
  Ok(Json(LoginResponse { token, user: profile }))
}

// ─── Account management ──────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
) -> Result<Json<UserProfile>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  let profile = state.users.get_by_id(&actor, actor.user_id).await?;
  Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameBody {
  pub username: String,
}

/// `PUT /users/:id/username`
pub async fn update_username<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateUsernameBody>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  require_nonempty(&body.username, "username")?;
  state.users.update_username(&actor, id, &body.username).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordBody {
  pub password: String,
}

/// `PUT /users/:id/password`
pub async fn update_password<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdatePasswordBody>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  require_nonempty(&body.password, "password")?;
  state.users.update_password(&actor, id, &body.password).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/:id` — admin only; cascades the account's schedules.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  state.users.delete(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /users` — admin only.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<UserProfile>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.users.get_all(&actor).await?))
}

/// `GET /users/with-schedules` — admin only.
pub async fn list_with_schedules<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<UserWithSchedules>>, ApiError>
where
  S: TimetableStore + Send + Sync + 'static,
{
  Ok(Json(state.users.get_all_with_schedules(&actor).await?))
}
