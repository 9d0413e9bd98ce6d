//! Subject — a course offering from the catalog.
//!
//! A subject owns its classes outright: updating a subject replaces the
//! whole class set, and deleting a subject destroys its classes. Schedules
//! only ever hold subjects by reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::class::Class;

/// A catalog entry: name, instructor, and at least one weekly class.
/// The name is globally unique across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub name:       String,
  pub instructor: String,
  pub classes:    Vec<Class>,
  pub created_at: DateTime<Utc>,
}

/// Write-side input for creating or fully replacing a subject.
/// `subject_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub name:       String,
  pub instructor: String,
  pub classes:    Vec<Class>,
}

impl NewSubject {
  pub fn new(
    name: impl Into<String>,
    instructor: impl Into<String>,
    classes: Vec<Class>,
  ) -> Self {
    Self { name: name.into(), instructor: instructor.into(), classes }
  }
}
