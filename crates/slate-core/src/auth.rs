//! Authentication seams: the acting identity and the opaque credential
//! collaborators.
//!
//! The domain never hashes a password or mints a token itself; it goes
//! through these traits, implemented at the boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// The authenticated actor behind a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id:  Uuid,
  pub is_admin: bool,
}

impl Identity {
  /// The owner-or-admin rule threaded through every protected operation.
  pub fn can_act_for(&self, owner_id: Uuid) -> bool {
    self.is_admin || self.user_id == owner_id
  }
}

/// Opaque password hashing: `hash_password` produces a blob that only
/// `verify_password` can interpret.
pub trait CredentialHasher: Send + Sync {
  fn hash_password(&self, password: &str) -> Result<String>;
  fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Opaque token issuance. `verify` treats any malformed, tampered, or
/// expired token as absence; the boundary maps absence to a 401.
pub trait TokenIssuer: Send + Sync {
  fn sign(&self, identity: &Identity) -> Result<String>;
  fn verify(&self, token: &str) -> Option<Identity>;
}
