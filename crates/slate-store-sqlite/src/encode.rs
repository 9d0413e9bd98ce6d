//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! weekdays and time blocks are their 1-based indices.

use chrono::{DateTime, Utc};
use slate_core::{
  class::{Class, TimeBlock, Weekday},
  schedule::Schedule,
  subject::Subject,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Weekday / TimeBlock ─────────────────────────────────────────────────────

pub fn encode_weekday(day: Weekday) -> i64 { i64::from(day.index()) }

pub fn decode_weekday(i: i64) -> Result<Weekday> {
  u8::try_from(i)
    .ok()
    .and_then(Weekday::from_index)
    .ok_or(Error::BadWeekday(i))
}

pub fn encode_block(block: TimeBlock) -> i64 { i64::from(block.index()) }

pub fn decode_block(i: i64) -> Result<TimeBlock> {
  u8::try_from(i)
    .ok()
    .and_then(TimeBlock::from_index)
    .ok_or(Error::BadTimeBlock(i))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      is_admin:      self.is_admin,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `classes` row.
pub struct RawClass {
  pub day:       i64,
  pub block:     i64,
  pub classroom: i64,
}

impl RawClass {
  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      day:       decode_weekday(self.day)?,
      block:     decode_block(self.block)?,
      classroom: self.classroom as u32,
    })
  }
}

/// A `subjects` row together with its `classes` rows.
pub struct RawSubject {
  pub subject_id: String,
  pub name:       String,
  pub instructor: String,
  pub created_at: String,
  pub classes:    Vec<RawClass>,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      name:       self.name,
      instructor: self.instructor,
      classes:    self
        .classes
        .into_iter()
        .map(RawClass::into_class)
        .collect::<Result<_>>()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `schedules` row together with its member subjects.
pub struct RawSchedule {
  pub schedule_id: String,
  pub owner_id:    String,
  pub name:        String,
  pub created_at:  String,
  pub subjects:    Vec<RawSubject>,
}

impl RawSchedule {
  pub fn into_schedule(self) -> Result<Schedule> {
    Ok(Schedule {
      schedule_id: decode_uuid(&self.schedule_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      name:        self.name,
      subjects:    self
        .subjects
        .into_iter()
        .map(RawSubject::into_subject)
        .collect::<Result<_>>()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
