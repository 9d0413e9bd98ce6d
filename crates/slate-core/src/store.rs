//! The `TimetableStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `slate-store-sqlite`).
//! Services depend on this abstraction, not on any concrete backend.
//!
//! Reads signal absence with `Option` / an empty `Vec` — absence is a value,
//! not an error; the service layer converts it into the domain `*_NOT_FOUND`
//! kinds. List order is insertion order and carries no meaning.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  class::{TimeBlock, Weekday},
  schedule::Schedule,
  subject::{NewSubject, Subject},
  user::{NewUser, User, UserWithSchedules},
};

/// Abstraction over a Slate storage backend.
///
/// Multi-entity mutations (`delete_user`, `update_subject`,
/// `delete_subject`, `delete_schedule`) are single logical transactions:
/// either every step lands or none does, so a partial failure can never
/// leave a schedule pointing at a destroyed subject.
pub trait TimetableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Fails if the username is already taken
  /// (UNIQUE in storage, closing the check-then-create race).
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve an account by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve an account by exact username. Returns `None` if not found.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// All accounts joined with their schedules (and member subjects).
  fn list_users_with_schedules(
    &self,
  ) -> impl Future<Output = Result<Vec<UserWithSchedules>, Self::Error>> + Send + '_;

  fn update_username<'a>(
    &'a self,
    id: Uuid,
    new_username: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn update_password<'a>(
    &'a self,
    id: Uuid,
    new_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete an account and cascade to its schedules (membership rows
  /// included). Referenced subjects are shared and survive.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Persist a subject together with its classes.
  fn create_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn get_subject_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn list_subjects_by_instructor<'a>(
    &'a self,
    instructor: &'a str,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  /// Subjects with at least one class on `day`.
  fn list_subjects_by_day(
    &self,
    day: Weekday,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Subjects with at least one class in `block`.
  fn list_subjects_by_block(
    &self,
    block: TimeBlock,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Subjects with at least one class in `classroom`.
  fn list_subjects_by_classroom(
    &self,
    classroom: u32,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Replace name, instructor, and the entire class set in one
  /// transaction. No stale class rows survive.
  fn update_subject(
    &self,
    id: Uuid,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Disconnect the subject from every schedule referencing it, delete its
  /// classes, then delete the subject — one transaction.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Schedules ─────────────────────────────────────────────────────────

  /// Create an empty schedule for `owner_id`. Fails if the owner already
  /// has a schedule with this name (UNIQUE in storage).
  fn create_schedule<'a>(
    &'a self,
    owner_id: Uuid,
    name: &'a str,
  ) -> impl Future<Output = Result<Schedule, Self::Error>> + Send + 'a;

  /// Retrieve a schedule with its member subjects (classes included).
  fn get_schedule(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Schedule>, Self::Error>> + Send + '_;

  /// Look up one owner's schedule by exact name — the uniqueness probe
  /// behind `SCHEDULE_NAME_IN_USE`.
  fn get_schedule_by_name<'a>(
    &'a self,
    owner_id: Uuid,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Schedule>, Self::Error>> + Send + 'a;

  fn list_schedules_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Schedule>, Self::Error>> + Send + '_;

  fn rename_schedule<'a>(
    &'a self,
    id: Uuid,
    new_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a schedule and its membership rows. Member subjects survive.
  fn delete_schedule(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Connect an existing subject to a schedule by reference.
  fn connect_subject(
    &self,
    schedule_id: Uuid,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Disconnect a subject reference. Never destroys the subject.
  fn disconnect_subject(
    &self,
    schedule_id: Uuid,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
