//! The closed domain error vocabulary.
//!
//! Every failure a service can report is one of these named kinds; the HTTP
//! boundary maps kinds to status codes without re-deriving anything. Storage
//! and credential failures are carried, never swallowed.

use thiserror::Error;
use uuid::Uuid;

use crate::schedule::Conflict;

#[derive(Debug, Error)]
pub enum Error {
  #[error("username already in use: {0:?}")]
  UsernameInUse(String),

  // No payload: lookups also miss by username, where there is no id to name.
  #[error("user not found")]
  UserNotFound,

  #[error("incorrect password")]
  IncorrectPassword,

  #[error("new value is identical to the current one")]
  NoChange,

  #[error("not authorized")]
  NotAuthorized,

  #[error("subject already exists: {0:?}")]
  SubjectAlreadyExists(String),

  #[error("subject not found")]
  SubjectNotFound,

  #[error("schedule name already in use: {0:?}")]
  ScheduleNameInUse(String),

  #[error("schedule not found: {0}")]
  ScheduleNotFound(Uuid),

  #[error("subject {0} is already in the schedule")]
  SubjectAlreadyInSchedule(Uuid),

  #[error("subject {0} is not in the schedule")]
  SubjectNotInSchedule(Uuid),

  #[error("{} time-slot conflict(s) with current members", .0.len())]
  ConflictsFound(Vec<Conflict>),

  /// The password-hashing or token-signing collaborator failed.
  #[error("credential error: {0}")]
  Credential(String),

  /// A storage failure, re-raised unchanged.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a storage backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// The stable machine-readable name of this kind, as surfaced to clients.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::UsernameInUse(_) => "USERNAME_IN_USE",
      Self::UserNotFound => "USER_NOT_FOUND",
      Self::IncorrectPassword => "INCORRECT_PASSWORD",
      Self::NoChange => "NO_CHANGE",
      Self::NotAuthorized => "NOT_AUTHORIZED",
      Self::SubjectAlreadyExists(_) => "SUBJECT_ALREADY_EXISTS",
      Self::SubjectNotFound => "SUBJECT_NOT_FOUND",
      Self::ScheduleNameInUse(_) => "SCHEDULE_NAME_IN_USE",
      Self::ScheduleNotFound(_) => "SCHEDULE_NOT_FOUND",
      Self::SubjectAlreadyInSchedule(_) => "SUBJECT_ALREADY_IN_SCHEDULE",
      Self::SubjectNotInSchedule(_) => "SUBJECT_NOT_IN_SCHEDULE",
      Self::ConflictsFound(_) => "CONFLICTS_FOUND",
      Self::Credential(_) => "CREDENTIAL_ERROR",
      Self::Store(_) => "STORE_ERROR",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
