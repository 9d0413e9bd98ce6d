//! User — an account owning zero or more schedules.
//!
//! `User` carries the opaque password hash and therefore does not implement
//! `Serialize`; everything that leaves the service boundary is a
//! [`UserProfile`] with the credential stripped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::Schedule;

/// A stored account. The hash is an uninterpreted blob produced by the
/// credential-hashing collaborator.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    DateTime<Utc>,
}

impl User {
  /// The outward view of this account, without the credential.
  pub fn profile(&self) -> UserProfile {
    UserProfile {
      user_id:    self.user_id,
      username:   self.username.clone(),
      is_admin:   self.is_admin,
      created_at: self.created_at,
    }
  }
}

/// What callers outside the domain see of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub username:   String,
  pub is_admin:   bool,
  pub created_at: DateTime<Utc>,
}

/// A profile bundled with the account's schedules, for the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithSchedules {
  pub profile:   UserProfile,
  pub schedules: Vec<Schedule>,
}

/// Write-side input for creating an account. The hash is produced by the
/// caller; the store never sees a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub is_admin:      bool,
}
