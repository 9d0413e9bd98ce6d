//! [`SqliteStore`] — the SQLite implementation of [`TimetableStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use slate_core::{
  class::{Class, TimeBlock, Weekday},
  schedule::Schedule,
  store::TimetableStore,
  subject::{NewSubject, Subject},
  user::{NewUser, User, UserWithSchedules},
};

use crate::{
  encode::{
    RawClass, RawSchedule, RawSubject, RawUser, decode_dt, encode_block,
    encode_dt, encode_uuid, encode_weekday,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Slate timetable store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// is serialised onto one connection, so every multi-statement transaction
/// below is atomic with respect to other store calls.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row-reading helpers (run inside `conn.call` closures) ───────────────────

fn read_classes(
  conn: &rusqlite::Connection,
  subject_id: &str,
) -> rusqlite::Result<Vec<RawClass>> {
  let mut stmt = conn.prepare(
    "SELECT day, block, classroom FROM classes WHERE subject_id = ?1",
  )?;
  stmt
    .query_map(rusqlite::params![subject_id], |row| {
      Ok(RawClass {
        day:       row.get(0)?,
        block:     row.get(1)?,
        classroom: row.get(2)?,
      })
    })?
    .collect()
}

/// `sql` must project (subject_id, name, instructor, created_at).
fn read_subjects(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<RawSubject>> {
  let mut stmt = conn.prepare(sql)?;
  let mut subjects = stmt
    .query_map(params, |row| {
      Ok(RawSubject {
        subject_id: row.get(0)?,
        name:       row.get(1)?,
        instructor: row.get(2)?,
        created_at: row.get(3)?,
        classes:    Vec::new(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for subject in &mut subjects {
    subject.classes = read_classes(conn, &subject.subject_id)?;
  }
  Ok(subjects)
}

/// `sql` must project (schedule_id, owner_id, name, created_at).
fn read_schedules(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<RawSchedule>> {
  let mut stmt = conn.prepare(sql)?;
  let mut schedules = stmt
    .query_map(params, |row| {
      Ok(RawSchedule {
        schedule_id: row.get(0)?,
        owner_id:    row.get(1)?,
        name:        row.get(2)?,
        created_at:  row.get(3)?,
        subjects:    Vec::new(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for schedule in &mut schedules {
    schedule.subjects = read_subjects(
      conn,
      "SELECT s.subject_id, s.name, s.instructor, s.created_at
       FROM subjects s
       JOIN schedule_subjects m ON m.subject_id = s.subject_id
       WHERE m.schedule_id = ?1
       ORDER BY m.added_at",
      &[&schedule.schedule_id],
    )?;
  }
  Ok(schedules)
}

/// `sql` must project (user_id, username, password_hash, is_admin,
/// created_at).
fn read_users(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<RawUser>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(params, |row| {
      Ok(RawUser {
        user_id:       row.get(0)?,
        username:      row.get(1)?,
        password_hash: row.get(2)?,
        is_admin:      row.get(3)?,
        created_at:    row.get(4)?,
      })
    })?
    .collect()
}

/// Insert the class rows for `subject_id`. Caller provides the transaction.
fn insert_classes(
  tx: &rusqlite::Transaction,
  subject_id: &str,
  classes: &[(i64, i64, i64)],
) -> rusqlite::Result<()> {
  for (day, block, classroom) in classes {
    tx.execute(
      "INSERT INTO classes (class_id, subject_id, day, block, classroom)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        subject_id,
        day,
        block,
        classroom,
      ],
    )?;
  }
  Ok(())
}

/// True when `err` is a UNIQUE/PRIMARY KEY violation whose message names
/// `column` (SQLite reports e.g. "UNIQUE constraint failed: users.username").
fn unique_violation(err: &tokio_rusqlite::Error, column: &str) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, Some(msg)))
      if f.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(column)
  )
}

fn encoded_classes(classes: &[Class]) -> Vec<(i64, i64, i64)> {
  classes
    .iter()
    .map(|c| {
      (encode_weekday(c.day), encode_block(c.block), i64::from(c.classroom))
    })
    .collect()
}

// ─── TimetableStore impl ─────────────────────────────────────────────────────

impl TimetableStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      is_admin:      input.is_admin,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let at_str   = encode_dt(user.created_at);
    let username = user.username.clone();
    let hash     = user.password_hash.clone();
    let is_admin = user.is_admin;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, password_hash, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, hash, is_admin, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "users.username") {
          Error::UsernameTaken(user.username.clone())
        } else {
          e.into()
        }
      })?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          read_users(
            conn,
            "SELECT user_id, username, password_hash, is_admin, created_at
             FROM users WHERE user_id = ?1",
            &[&id_str],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          read_users(
            conn,
            "SELECT user_id, username, password_hash, is_admin, created_at
             FROM users WHERE username = ?1",
            &[&username],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        Ok(read_users(
          conn,
          "SELECT user_id, username, password_hash, is_admin, created_at
           FROM users",
          &[],
        )?)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn list_users_with_schedules(&self) -> Result<Vec<UserWithSchedules>> {
    let raws: Vec<(RawUser, Vec<RawSchedule>)> = self
      .conn
      .call(|conn| {
        let users = read_users(
          conn,
          "SELECT user_id, username, password_hash, is_admin, created_at
           FROM users",
          &[],
        )?;

        let mut out = Vec::with_capacity(users.len());
        for user in users {
          let schedules = read_schedules(
            conn,
            "SELECT schedule_id, owner_id, name, created_at
             FROM schedules WHERE owner_id = ?1",
            &[&user.user_id],
          )?;
          out.push((user, schedules));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(user, schedules)| {
        Ok(UserWithSchedules {
          profile:   user.into_user()?.profile(),
          schedules: schedules
            .into_iter()
            .map(RawSchedule::into_schedule)
            .collect::<Result<Vec<Schedule>>>()?,
        })
      })
      .collect()
  }

  async fn update_username(&self, id: Uuid, new_username: &str) -> Result<()> {
    let id_str   = encode_uuid(id);
    let username = new_username.to_owned();

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET username = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, username],
        )?)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "users.username") {
          Error::UsernameTaken(new_username.to_owned())
        } else {
          e.into()
        }
      })?;

    if affected == 0 {
      return Err(Error::MissingRow { entity: "user", id });
    }
    Ok(())
  }

  async fn update_password(&self, id: Uuid, new_hash: &str) -> Result<()> {
    let id_str = encode_uuid(id);
    let hash   = new_hash.to_owned();

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, hash],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::MissingRow { entity: "user", id });
    }
    Ok(())
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM schedule_subjects WHERE schedule_id IN
             (SELECT schedule_id FROM schedules WHERE owner_id = ?1)",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM schedules WHERE owner_id = ?1",
          rusqlite::params![id_str],
        )?;
        let affected = tx.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(affected)
      })
      .await?;

    if affected == 0 {
      return Err(Error::MissingRow { entity: "user", id });
    }
    Ok(())
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn create_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      name:       input.name,
      instructor: input.instructor,
      classes:    input.classes,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(subject.subject_id);
    let at_str     = encode_dt(subject.created_at);
    let name       = subject.name.clone();
    let instructor = subject.instructor.clone();
    let classes    = encoded_classes(&subject.classes);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO subjects (subject_id, name, instructor, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, instructor, at_str],
        )?;
        insert_classes(&tx, &id_str, &classes)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "subjects.name") {
          Error::SubjectNameTaken(subject.name.clone())
        } else {
          e.into()
        }
      })?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          read_subjects(
            conn,
            "SELECT subject_id, name, instructor, created_at
             FROM subjects WHERE subject_id = ?1",
            &[&id_str],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn get_subject_by_name(&self, name: &str) -> Result<Option<Subject>> {
    let name = name.to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          read_subjects(
            conn,
            "SELECT subject_id, name, instructor, created_at
             FROM subjects WHERE name = ?1",
            &[&name],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        Ok(read_subjects(
          conn,
          "SELECT subject_id, name, instructor, created_at FROM subjects",
          &[],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn list_subjects_by_instructor(
    &self,
    instructor: &str,
  ) -> Result<Vec<Subject>> {
    let instructor = instructor.to_owned();

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(read_subjects(
          conn,
          "SELECT subject_id, name, instructor, created_at
           FROM subjects WHERE instructor = ?1",
          &[&instructor],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn list_subjects_by_day(&self, day: Weekday) -> Result<Vec<Subject>> {
    let day = encode_weekday(day);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(read_subjects(
          conn,
          "SELECT DISTINCT s.subject_id, s.name, s.instructor, s.created_at
           FROM subjects s
           JOIN classes c ON c.subject_id = s.subject_id
           WHERE c.day = ?1",
          &[&day],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn list_subjects_by_block(
    &self,
    block: TimeBlock,
  ) -> Result<Vec<Subject>> {
    let block = encode_block(block);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(read_subjects(
          conn,
          "SELECT DISTINCT s.subject_id, s.name, s.instructor, s.created_at
           FROM subjects s
           JOIN classes c ON c.subject_id = s.subject_id
           WHERE c.block = ?1",
          &[&block],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn list_subjects_by_classroom(
    &self,
    classroom: u32,
  ) -> Result<Vec<Subject>> {
    let classroom = i64::from(classroom);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(read_subjects(
          conn,
          "SELECT DISTINCT s.subject_id, s.name, s.instructor, s.created_at
           FROM subjects s
           JOIN classes c ON c.subject_id = s.subject_id
           WHERE c.classroom = ?1",
          &[&classroom],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn update_subject(&self, id: Uuid, input: NewSubject) -> Result<Subject> {
    let id_str     = encode_uuid(id);
    let name       = input.name.clone();
    let instructor = input.instructor.clone();
    let classes    = encoded_classes(&input.classes);

    // The whole replacement is one transaction: the old class set is gone
    // and the new one present, or nothing changed at all.
    let created_at_str: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let created_at: Option<String> = tx
          .query_row(
            "SELECT created_at FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(created_at) = created_at else {
          return Ok(None);
        };

        tx.execute(
          "UPDATE subjects SET name = ?2, instructor = ?3 WHERE subject_id = ?1",
          rusqlite::params![id_str, name, instructor],
        )?;
        tx.execute(
          "DELETE FROM classes WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        insert_classes(&tx, &id_str, &classes)?;

        tx.commit()?;
        Ok(Some(created_at))
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "subjects.name") {
          Error::SubjectNameTaken(input.name.clone())
        } else {
          e.into()
        }
      })?;

    let created_at_str =
      created_at_str.ok_or(Error::MissingRow { entity: "subject", id })?;

    Ok(Subject {
      subject_id: id,
      name:       input.name,
      instructor: input.instructor,
      classes:    input.classes,
      created_at: decode_dt(&created_at_str)?,
    })
  }

  async fn delete_subject(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    // Disconnect from every schedule, destroy the classes, then the
    // subject — atomically, so no schedule can be left dangling.
    let existed: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM schedule_subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM classes WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !existed {
      return Err(Error::MissingRow { entity: "subject", id });
    }
    Ok(())
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  async fn create_schedule(&self, owner_id: Uuid, name: &str) -> Result<Schedule> {
    let schedule = Schedule {
      schedule_id: Uuid::new_v4(),
      owner_id,
      name: name.to_owned(),
      subjects: Vec::new(),
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(schedule.schedule_id);
    let owner_str = encode_uuid(owner_id);
    let at_str    = encode_dt(schedule.created_at);
    let name_own  = schedule.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schedules (schedule_id, owner_id, name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, owner_str, name_own, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "schedules.owner_id") {
          Error::ScheduleNameTaken(schedule.name.clone())
        } else {
          e.into()
        }
      })?;

    Ok(schedule)
  }

  async fn get_schedule(&self, id: Uuid) -> Result<Option<Schedule>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSchedule> = self
      .conn
      .call(move |conn| {
        Ok(
          read_schedules(
            conn,
            "SELECT schedule_id, owner_id, name, created_at
             FROM schedules WHERE schedule_id = ?1",
            &[&id_str],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawSchedule::into_schedule).transpose()
  }

  async fn get_schedule_by_name(
    &self,
    owner_id: Uuid,
    name: &str,
  ) -> Result<Option<Schedule>> {
    let owner_str = encode_uuid(owner_id);
    let name      = name.to_owned();

    let raw: Option<RawSchedule> = self
      .conn
      .call(move |conn| {
        Ok(
          read_schedules(
            conn,
            "SELECT schedule_id, owner_id, name, created_at
             FROM schedules WHERE owner_id = ?1 AND name = ?2",
            &[&owner_str, &name],
          )?
          .pop(),
        )
      })
      .await?;

    raw.map(RawSchedule::into_schedule).transpose()
  }

  async fn list_schedules_by_owner(&self, owner_id: Uuid) -> Result<Vec<Schedule>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawSchedule> = self
      .conn
      .call(move |conn| {
        Ok(read_schedules(
          conn,
          "SELECT schedule_id, owner_id, name, created_at
           FROM schedules WHERE owner_id = ?1",
          &[&owner_str],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSchedule::into_schedule).collect()
  }

  async fn rename_schedule(&self, id: Uuid, new_name: &str) -> Result<()> {
    let id_str = encode_uuid(id);
    let name   = new_name.to_owned();

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE schedules SET name = ?2 WHERE schedule_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "schedules.owner_id") {
          Error::ScheduleNameTaken(new_name.to_owned())
        } else {
          e.into()
        }
      })?;

    if affected == 0 {
      return Err(Error::MissingRow { entity: "schedule", id });
    }
    Ok(())
  }

  async fn delete_schedule(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM schedule_subjects WHERE schedule_id = ?1",
          rusqlite::params![id_str],
        )?;
        let affected = tx.execute(
          "DELETE FROM schedules WHERE schedule_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(affected)
      })
      .await?;

    if affected == 0 {
      return Err(Error::MissingRow { entity: "schedule", id });
    }
    Ok(())
  }

  async fn connect_subject(&self, schedule_id: Uuid, subject_id: Uuid) -> Result<()> {
    let schedule_str = encode_uuid(schedule_id);
    let subject_str  = encode_uuid(subject_id);
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schedule_subjects (schedule_id, subject_id, added_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![schedule_str, subject_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if unique_violation(&e, "schedule_subjects") {
          Error::AlreadyConnected { schedule_id, subject_id }
        } else {
          e.into()
        }
      })?;

    Ok(())
  }

  async fn disconnect_subject(
    &self,
    schedule_id: Uuid,
    subject_id: Uuid,
  ) -> Result<()> {
    let schedule_str = encode_uuid(schedule_id);
    let subject_str  = encode_uuid(subject_id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM schedule_subjects WHERE schedule_id = ?1 AND subject_id = ?2",
          rusqlite::params![schedule_str, subject_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotConnected { schedule_id, subject_id });
    }
    Ok(())
  }
}
