//! Error type for `slate-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("weekday index out of range: {0}")]
  BadWeekday(i64),

  #[error("time block index out of range: {0}")]
  BadTimeBlock(i64),

  /// UNIQUE(users.username) violated.
  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  /// UNIQUE(subjects.name) violated.
  #[error("subject name already taken: {0:?}")]
  SubjectNameTaken(String),

  /// UNIQUE(schedules.owner_id, schedules.name) violated.
  #[error("owner already has a schedule named {0:?}")]
  ScheduleNameTaken(String),

  /// The membership row already exists (composite primary key).
  #[error("subject {subject_id} already connected to schedule {schedule_id}")]
  AlreadyConnected { schedule_id: Uuid, subject_id: Uuid },

  /// The membership row to remove does not exist.
  #[error("subject {subject_id} not connected to schedule {schedule_id}")]
  NotConnected { schedule_id: Uuid, subject_id: Uuid },

  /// A mutation targeted a row that is not there.
  #[error("{entity} not found: {id}")]
  MissingRow { entity: &'static str, id: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
