//! Schedule lifecycle and membership orchestration.
//!
//! Membership changes load the full aggregate, run the in-memory checks
//! (duplicate guard, then conflict detection), and only then touch storage,
//! so a rejected change never mutates anything.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  auth::Identity,
  error::{Error, Result},
  schedule::Schedule,
  store::TimetableStore,
};

pub struct ScheduleService<S> {
  store: Arc<S>,
}

impl<S: TimetableStore> ScheduleService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Create an empty schedule for `owner_id`. The name must not collide
  /// with another schedule of the same owner (exact, case-sensitive).
  pub async fn create(
    &self,
    actor: &Identity,
    owner_id: Uuid,
    name: &str,
  ) -> Result<Schedule> {
    if !actor.can_act_for(owner_id) {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_user(owner_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    let taken = self
      .store
      .get_schedule_by_name(owner_id, name)
      .await
      .map_err(Error::store)?;
    if taken.is_some() {
      return Err(Error::ScheduleNameInUse(name.to_string()));
    }

    let schedule = self
      .store
      .create_schedule(owner_id, name)
      .await
      .map_err(Error::store)?;
    tracing::info!(schedule_id = %schedule.schedule_id, owner_id = %owner_id, name, "schedule created");
    Ok(schedule)
  }

  pub async fn get_by_id(
    &self,
    actor: &Identity,
    id: Uuid,
  ) -> Result<Schedule> {
    let schedule = self
      .store
      .get_schedule(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ScheduleNotFound(id))?;
    if !actor.can_act_for(schedule.owner_id) {
      return Err(Error::NotAuthorized);
    }
    Ok(schedule)
  }

  pub async fn get_by_user(
    &self,
    actor: &Identity,
    user_id: Uuid,
  ) -> Result<Vec<Schedule>> {
    if !actor.can_act_for(user_id) {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    self
      .store
      .list_schedules_by_owner(user_id)
      .await
      .map_err(Error::store)
  }

  /// Rename a schedule. Renaming to the current name is a no-op; any other
  /// collision with a sibling schedule is rejected, same as at creation.
  pub async fn rename(
    &self,
    actor: &Identity,
    id: Uuid,
    new_name: &str,
  ) -> Result<()> {
    let schedule = self.get_by_id(actor, id).await?;
    if schedule.name == new_name {
      return Ok(());
    }

    // The same-name case returned above, so any hit here is a sibling.
    let taken = self
      .store
      .get_schedule_by_name(schedule.owner_id, new_name)
      .await
      .map_err(Error::store)?;
    if taken.is_some() {
      return Err(Error::ScheduleNameInUse(new_name.to_string()));
    }

    self
      .store
      .rename_schedule(id, new_name)
      .await
      .map_err(Error::store)?;
    tracing::info!(schedule_id = %id, new_name, "schedule renamed");
    Ok(())
  }

  /// Delete a schedule and its membership rows. Member subjects survive.
  pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<()> {
    self.get_by_id(actor, id).await?;
    self.store.delete_schedule(id).await.map_err(Error::store)?;
    tracing::info!(schedule_id = %id, "schedule deleted");
    Ok(())
  }

  /// Connect a subject to a schedule.
  ///
  /// Guards, in order: schedule exists, actor owns it (or is admin),
  /// subject exists, subject not already a member, no time-slot conflict
  /// with current members. Only then is the reference persisted; the
  /// updated aggregate is returned.
  pub async fn add_subject(
    &self,
    actor: &Identity,
    schedule_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Schedule> {
    let mut schedule = self.get_by_id(actor, schedule_id).await?;

    let subject = self
      .store
      .get_subject(subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)?;

    if schedule.contains_subject(subject_id) {
      return Err(Error::SubjectAlreadyInSchedule(subject_id));
    }

    schedule.add_subject(subject)?;

    self
      .store
      .connect_subject(schedule_id, subject_id)
      .await
      .map_err(Error::store)?;
    tracing::info!(schedule_id = %schedule_id, subject_id = %subject_id, "subject added to schedule");
    Ok(schedule)
  }

  /// Disconnect a subject reference from a schedule. The subject itself
  /// is never destroyed here.
  pub async fn remove_subject(
    &self,
    actor: &Identity,
    schedule_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Schedule> {
    let mut schedule = self.get_by_id(actor, schedule_id).await?;

    self
      .store
      .get_subject(subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)?;

    schedule.remove_subject(subject_id)?;

    self
      .store
      .disconnect_subject(schedule_id, subject_id)
      .await
      .map_err(Error::store)?;
    tracing::info!(schedule_id = %schedule_id, subject_id = %subject_id, "subject removed from schedule");
    Ok(schedule)
  }
}
