//! Catalog management and lookups for subjects.
//!
//! Writes are admin actions; the read variants are open to everyone.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  auth::Identity,
  class::{TimeBlock, Weekday},
  error::{Error, Result},
  store::TimetableStore,
  subject::{NewSubject, Subject},
};

pub struct SubjectService<S> {
  store: Arc<S>,
}

impl<S: TimetableStore> SubjectService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Add a subject to the catalog. Admin only; the name must be new.
  pub async fn create(
    &self,
    actor: &Identity,
    input: NewSubject,
  ) -> Result<Subject> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    let existing = self
      .store
      .get_subject_by_name(&input.name)
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(Error::SubjectAlreadyExists(input.name));
    }

    let subject =
      self.store.create_subject(input).await.map_err(Error::store)?;
    tracing::info!(subject_id = %subject.subject_id, name = %subject.name, "subject created");
    Ok(subject)
  }

  /// Replace a subject's name, instructor, and entire class set.
  /// Admin only. The store guarantees no stale classes survive.
  pub async fn update(
    &self,
    actor: &Identity,
    id: Uuid,
    input: NewSubject,
  ) -> Result<Subject> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)?;

    let subject =
      self.store.update_subject(id, input).await.map_err(Error::store)?;
    tracing::info!(subject_id = %id, "subject updated");
    Ok(subject)
  }

  /// Remove a subject from the catalog. Admin only. The store detaches it
  /// from every schedule before destroying it and its classes, as one
  /// transaction.
  pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<()> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)?;

    self.store.delete_subject(id).await.map_err(Error::store)?;
    tracing::info!(subject_id = %id, "subject deleted");
    Ok(())
  }

  pub async fn get_all(&self) -> Result<Vec<Subject>> {
    self.store.list_subjects().await.map_err(Error::store)
  }

  pub async fn get_by_id(&self, id: Uuid) -> Result<Subject> {
    self
      .store
      .get_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)
  }

  pub async fn get_by_name(&self, name: &str) -> Result<Subject> {
    self
      .store
      .get_subject_by_name(name)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound)
  }

  pub async fn get_by_instructor(
    &self,
    instructor: &str,
  ) -> Result<Vec<Subject>> {
    self
      .store
      .list_subjects_by_instructor(instructor)
      .await
      .map_err(Error::store)
  }

  pub async fn get_by_day(&self, day: Weekday) -> Result<Vec<Subject>> {
    self.store.list_subjects_by_day(day).await.map_err(Error::store)
  }

  pub async fn get_by_block(&self, block: TimeBlock) -> Result<Vec<Subject>> {
    self.store.list_subjects_by_block(block).await.map_err(Error::store)
  }

  pub async fn get_by_classroom(
    &self,
    classroom: u32,
  ) -> Result<Vec<Subject>> {
    self
      .store
      .list_subjects_by_classroom(classroom)
      .await
      .map_err(Error::store)
  }
}
