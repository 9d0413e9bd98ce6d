//! Account registration, login, and administration.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  auth::{CredentialHasher, Identity},
  error::{Error, Result},
  store::TimetableStore,
  user::{NewUser, UserProfile, UserWithSchedules},
};

/// Orchestrates account operations over a storage backend and the opaque
/// password-hashing collaborator. Hashes never leave this layer: every
/// outward value is a [`UserProfile`].
pub struct UserService<S> {
  store:  Arc<S>,
  hasher: Arc<dyn CredentialHasher>,
}

impl<S: TimetableStore> UserService<S> {
  pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self {
    Self { store, hasher }
  }

  /// Create a regular (never admin) account.
  pub async fn register(
    &self,
    username: &str,
    password: &str,
  ) -> Result<UserProfile> {
    let taken = self
      .store
      .get_user_by_username(username)
      .await
      .map_err(Error::store)?;
    if taken.is_some() {
      return Err(Error::UsernameInUse(username.to_string()));
    }

    let password_hash = self.hasher.hash_password(password)?;
    let user = self
      .store
      .create_user(NewUser {
        username: username.to_string(),
        password_hash,
        is_admin: false,
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(user_id = %user.user_id, username, "registered user");
    Ok(user.profile())
  }

  /// Verify credentials and return the account's profile.
  pub async fn login(
    &self,
    username: &str,
    password: &str,
  ) -> Result<UserProfile> {
    let user = self
      .store
      .get_user_by_username(username)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    if !self.hasher.verify_password(password, &user.password_hash) {
      return Err(Error::IncorrectPassword);
    }
    Ok(user.profile())
  }

  pub async fn get_by_id(
    &self,
    actor: &Identity,
    user_id: Uuid,
  ) -> Result<UserProfile> {
    if !actor.can_act_for(user_id) {
      return Err(Error::NotAuthorized);
    }
    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;
    Ok(user.profile())
  }

  /// Change an account's username. Owner or admin only.
  pub async fn update_username(
    &self,
    actor: &Identity,
    user_id: Uuid,
    new_username: &str,
  ) -> Result<()> {
    if !actor.can_act_for(user_id) {
      return Err(Error::NotAuthorized);
    }
    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    if user.username == new_username {
      return Err(Error::NoChange);
    }

    let holder = self
      .store
      .get_user_by_username(new_username)
      .await
      .map_err(Error::store)?;
    if holder.is_some() {
      return Err(Error::UsernameInUse(new_username.to_string()));
    }

    self
      .store
      .update_username(user_id, new_username)
      .await
      .map_err(Error::store)?;
    tracing::info!(user_id = %user_id, new_username, "username changed");
    Ok(())
  }

  /// Rehash and persist a new password. Owners may change their own;
  /// changing anyone else's requires the admin capability.
  pub async fn update_password(
    &self,
    actor: &Identity,
    user_id: Uuid,
    new_password: &str,
  ) -> Result<()> {
    if !actor.can_act_for(user_id) {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    let new_hash = self.hasher.hash_password(new_password)?;
    self
      .store
      .update_password(user_id, &new_hash)
      .await
      .map_err(Error::store)?;
    tracing::info!(user_id = %user_id, "password changed");
    Ok(())
  }

  /// Delete an account, cascading its schedules. Admin only; subjects are
  /// shared catalog entries and survive.
  pub async fn delete(&self, actor: &Identity, user_id: Uuid) -> Result<()> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound)?;

    self.store.delete_user(user_id).await.map_err(Error::store)?;
    tracing::info!(user_id = %user_id, "user deleted");
    Ok(())
  }

  /// List every account. Admin only.
  pub async fn get_all(&self, actor: &Identity) -> Result<Vec<UserProfile>> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    let users = self.store.list_users().await.map_err(Error::store)?;
    Ok(users.iter().map(|u| u.profile()).collect())
  }

  /// List every account with its schedules. Admin only.
  pub async fn get_all_with_schedules(
    &self,
    actor: &Identity,
  ) -> Result<Vec<UserWithSchedules>> {
    if !actor.is_admin {
      return Err(Error::NotAuthorized);
    }
    self
      .store
      .list_users_with_schedules()
      .await
      .map_err(Error::store)
  }
}
