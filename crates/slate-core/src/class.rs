//! Class — one weekly timetable slot belonging to a subject.
//!
//! A class is a value object: it has no identity of its own and lives and
//! dies with its parent subject. Two classes collide when they share a day
//! and a time block; the classroom never matters for collision.

use serde::{Deserialize, Serialize};

/// Teaching day. The institution runs Monday through Friday only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
}

impl Weekday {
  /// 1-based index used by the storage layer and URL parameters
  /// (1 = Monday … 5 = Friday).
  pub fn index(self) -> u8 {
    match self {
      Self::Monday => 1,
      Self::Tuesday => 2,
      Self::Wednesday => 3,
      Self::Thursday => 4,
      Self::Friday => 5,
    }
  }

  pub fn from_index(i: u8) -> Option<Self> {
    match i {
      1 => Some(Self::Monday),
      2 => Some(Self::Tuesday),
      3 => Some(Self::Wednesday),
      4 => Some(Self::Thursday),
      5 => Some(Self::Friday),
      _ => None,
    }
  }
}

/// One of the six fixed teaching slots in a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBlock {
  EarlyMorning,
  LateMorning,
  EarlyAfternoon,
  LateAfternoon,
  Evening,
  Night,
}

impl TimeBlock {
  /// 1-based index used by the storage layer and URL parameters
  /// (1 = 08:00 … 6 = 21:00).
  pub fn index(self) -> u8 {
    match self {
      Self::EarlyMorning => 1,
      Self::LateMorning => 2,
      Self::EarlyAfternoon => 3,
      Self::LateAfternoon => 4,
      Self::Evening => 5,
      Self::Night => 6,
    }
  }

  pub fn from_index(i: u8) -> Option<Self> {
    match i {
      1 => Some(Self::EarlyMorning),
      2 => Some(Self::LateMorning),
      3 => Some(Self::EarlyAfternoon),
      4 => Some(Self::LateAfternoon),
      5 => Some(Self::Evening),
      6 => Some(Self::Night),
      _ => None,
    }
  }

  /// Wall-clock start time of the block.
  pub fn starts_at(self) -> &'static str {
    match self {
      Self::EarlyMorning => "08:00",
      Self::LateMorning => "10:00",
      Self::EarlyAfternoon => "13:30",
      Self::LateAfternoon => "15:30",
      Self::Evening => "19:00",
      Self::Night => "21:00",
    }
  }
}

/// A single weekly occurrence of a subject: day, time block, and room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Class {
  pub day:       Weekday,
  pub block:     TimeBlock,
  pub classroom: u32,
}

impl Class {
  /// Two classes overlap when they share a day and a time block.
  /// The classroom is irrelevant: a student cannot attend two rooms at once.
  pub fn overlaps(&self, other: &Class) -> bool {
    self.day == other.day && self.block == other.block
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn weekday_index_round_trip() {
    for i in 1..=5 {
      let day = Weekday::from_index(i).unwrap();
      assert_eq!(day.index(), i);
    }
    assert!(Weekday::from_index(0).is_none());
    assert!(Weekday::from_index(6).is_none());
  }

  #[test]
  fn time_block_index_round_trip() {
    for i in 1..=6 {
      let block = TimeBlock::from_index(i).unwrap();
      assert_eq!(block.index(), i);
    }
    assert!(TimeBlock::from_index(0).is_none());
    assert!(TimeBlock::from_index(7).is_none());
  }

  #[test]
  fn overlap_ignores_classroom() {
    let a = Class {
      day:       Weekday::Monday,
      block:     TimeBlock::EarlyAfternoon,
      classroom: 302,
    };
    let b = Class { classroom: 117, ..a };
    assert!(a.overlaps(&b));
  }

  #[test]
  fn different_day_or_block_does_not_overlap() {
    let a = Class {
      day:       Weekday::Monday,
      block:     TimeBlock::EarlyAfternoon,
      classroom: 302,
    };
    assert!(!a.overlaps(&Class { day: Weekday::Tuesday, ..a }));
    assert!(!a.overlaps(&Class { block: TimeBlock::Evening, ..a }));
  }
}
