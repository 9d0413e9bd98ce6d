//! Schedule — one student's named, conflict-free timetable.
//!
//! The aggregate holds its member subjects by value for in-memory checks,
//! but in storage the membership is a plain reference: removing a subject
//! from a schedule never destroys the subject itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  class::Class,
  error::{Error, Result},
  subject::Subject,
};

/// A collision between a candidate class and a class of a current member.
/// Carried as the payload of [`Error::ConflictsFound`] so the boundary can
/// render a precise message without re-deriving anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
  /// The member subject already in the schedule.
  pub subject_id:   Uuid,
  pub subject_name: String,
  /// The member's class occupying the slot.
  pub existing:     Class,
  /// The candidate's class contending for the same slot.
  pub candidate:    Class,
}

/// A named collection of subject references owned by one user.
/// Invariant: no two classes across member subjects share (day, block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
  pub schedule_id: Uuid,
  pub owner_id:    Uuid,
  pub name:        String,
  pub subjects:    Vec<Subject>,
  pub created_at:  DateTime<Utc>,
}

impl Schedule {
  /// Find every (member class, candidate class) pair occupying the same
  /// day and time block.
  ///
  /// Pure and read-only; both class sets are small, so the Cartesian
  /// product is fine.
  pub fn check_conflicts(&self, candidate: &Subject) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for member in &self.subjects {
      for existing in &member.classes {
        for new_class in &candidate.classes {
          if existing.overlaps(new_class) {
            conflicts.push(Conflict {
              subject_id:   member.subject_id,
              subject_name: member.name.clone(),
              existing:     *existing,
              candidate:    *new_class,
            });
          }
        }
      }
    }
    conflicts
  }

  /// Append `subject` if none of its classes collide with a current
  /// member's. On conflict the schedule is left untouched and the full
  /// collision list is returned in the error.
  ///
  /// Duplicate-membership is not checked here; that guard belongs to the
  /// service layer.
  pub fn add_subject(&mut self, subject: Subject) -> Result<()> {
    let conflicts = self.check_conflicts(&subject);
    if !conflicts.is_empty() {
      return Err(Error::ConflictsFound(conflicts));
    }
    self.subjects.push(subject);
    Ok(())
  }

  /// Remove the member matching `subject_id`.
  pub fn remove_subject(&mut self, subject_id: Uuid) -> Result<()> {
    let position = self
      .subjects
      .iter()
      .position(|s| s.subject_id == subject_id)
      .ok_or(Error::SubjectNotInSchedule(subject_id))?;
    self.subjects.remove(position);
    Ok(())
  }

  pub fn contains_subject(&self, subject_id: Uuid) -> bool {
    self.subjects.iter().any(|s| s.subject_id == subject_id)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::class::{TimeBlock, Weekday};

  fn subject(name: &str, classes: &[(Weekday, TimeBlock)]) -> Subject {
    Subject {
      subject_id: Uuid::new_v4(),
      name:       name.to_string(),
      instructor: "somebody".to_string(),
      classes:    classes
        .iter()
        .map(|&(day, block)| Class { day, block, classroom: 100 })
        .collect(),
      created_at: Utc.timestamp_opt(0, 0).unwrap(),
    }
  }

  fn empty_schedule() -> Schedule {
    Schedule {
      schedule_id: Uuid::new_v4(),
      owner_id:    Uuid::new_v4(),
      name:        "Sem1".to_string(),
      subjects:    vec![],
      created_at:  Utc.timestamp_opt(0, 0).unwrap(),
    }
  }

  #[test]
  fn disjoint_subjects_coexist() {
    let mut schedule = empty_schedule();
    let math =
      subject("Matemática", &[(Weekday::Monday, TimeBlock::EarlyAfternoon)]);
    let oop = subject("POO", &[(Weekday::Monday, TimeBlock::Evening)]);

    schedule.add_subject(math).unwrap();
    schedule.add_subject(oop).unwrap();
    assert_eq!(schedule.subjects.len(), 2);
  }

  #[test]
  fn colliding_subject_is_rejected_with_pairs() {
    let mut schedule = empty_schedule();
    let math =
      subject("Matemática", &[(Weekday::Monday, TimeBlock::EarlyAfternoon)]);
    let oop = subject("POO", &[(Weekday::Monday, TimeBlock::Evening)]);
    let math_id = math.subject_id;
    schedule.add_subject(math).unwrap();
    schedule.add_subject(oop).unwrap();

    let calc =
      subject("Cálculo", &[(Weekday::Monday, TimeBlock::EarlyAfternoon)]);
    let err = schedule.add_subject(calc).unwrap_err();

    let conflicts = match err {
      Error::ConflictsFound(c) => c,
      other => panic!("expected ConflictsFound, got {other:?}"),
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].subject_id, math_id);
    assert_eq!(conflicts[0].subject_name, "Matemática");
    assert_eq!(conflicts[0].existing.day, Weekday::Monday);
    assert_eq!(conflicts[0].existing.block, TimeBlock::EarlyAfternoon);

    // No partial mutation: the schedule still holds exactly the two members.
    assert_eq!(schedule.subjects.len(), 2);
    let names: Vec<_> =
      schedule.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Matemática", "POO"]);
  }

  #[test]
  fn conflict_detection_is_symmetric_in_content() {
    let a = subject("A", &[
      (Weekday::Monday, TimeBlock::EarlyMorning),
      (Weekday::Wednesday, TimeBlock::Evening),
    ]);
    let b = subject("B", &[(Weekday::Wednesday, TimeBlock::Evening)]);

    let mut with_a = empty_schedule();
    with_a.add_subject(a.clone()).unwrap();
    let a_vs_b = with_a.check_conflicts(&b);

    let mut with_b = empty_schedule();
    with_b.add_subject(b.clone()).unwrap();
    let b_vs_a = with_b.check_conflicts(&a);

    assert_eq!(a_vs_b.len(), 1);
    assert_eq!(b_vs_a.len(), 1);
    // Same colliding pair, with the subject/class roles swapped.
    assert_eq!(a_vs_b[0].existing, b_vs_a[0].candidate);
    assert_eq!(a_vs_b[0].candidate, b_vs_a[0].existing);
    assert_eq!(a_vs_b[0].subject_id, a.subject_id);
    assert_eq!(b_vs_a[0].subject_id, b.subject_id);
  }

  #[test]
  fn every_colliding_pair_is_reported() {
    let mut schedule = empty_schedule();
    let twice = subject("Twice", &[
      (Weekday::Monday, TimeBlock::EarlyMorning),
      (Weekday::Friday, TimeBlock::Night),
    ]);
    schedule.add_subject(twice).unwrap();

    let clash = subject("Clash", &[
      (Weekday::Monday, TimeBlock::EarlyMorning),
      (Weekday::Friday, TimeBlock::Night),
    ]);
    let conflicts = schedule.check_conflicts(&clash);
    assert_eq!(conflicts.len(), 2);
  }

  #[test]
  fn remove_then_add_round_trips() {
    let mut schedule = empty_schedule();
    let math =
      subject("Matemática", &[(Weekday::Tuesday, TimeBlock::LateMorning)]);
    let id = math.subject_id;

    schedule.add_subject(math.clone()).unwrap();
    schedule.remove_subject(id).unwrap();
    assert!(!schedule.contains_subject(id));

    schedule.add_subject(math).unwrap();
    assert!(schedule.contains_subject(id));
    assert_eq!(schedule.subjects.len(), 1);
  }

  #[test]
  fn remove_missing_subject_fails() {
    let mut schedule = empty_schedule();
    let id = Uuid::new_v4();
    let err = schedule.remove_subject(id).unwrap_err();
    assert!(matches!(err, Error::SubjectNotInSchedule(missing) if missing == id));
  }
}
