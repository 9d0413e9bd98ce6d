//! Concrete credential collaborators and the bearer-token extractor.
//!
//! The domain only knows the [`CredentialHasher`] and [`TokenIssuer`]
//! seams; this module provides the argon2 and signed-token implementations
//! and the axum extractor that turns an `Authorization` header into an
//! [`Identity`].

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{Duration, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use slate_core::{
  auth::{CredentialHasher, Identity, TokenIssuer},
  error::Error as DomainError,
  store::TimetableStore,
};

use crate::{AppState, error::ApiError};

// ─── Password hashing ────────────────────────────────────────────────────────

/// Argon2id hashing producing PHC strings (`$argon2id$v=19$…`).
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
  fn hash_password(&self, password: &str) -> slate_core::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| DomainError::Credential(e.to_string()))
  }

  fn verify_password(&self, password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
      .map(|parsed| {
        Argon2::default()
          .verify_password(password.as_bytes(), &parsed)
          .is_ok()
      })
      .unwrap_or(false)
  }
}

// ─── Token issuance ──────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct Claims {
  sub: Uuid,
  adm: bool,
  /// Expiry as unix seconds.
  exp: i64,
}

/// Tokens of the form `base64url(claims).hex(sha256(secret || claims))`.
/// Anything that fails to parse, verify, or is past `exp` is treated as
/// absent — the caller sees a plain 401 either way.
pub struct TokenSigner {
  secret: Vec<u8>,
  ttl:    Duration,
}

impl TokenSigner {
  pub fn new(secret: impl Into<Vec<u8>>, ttl_minutes: i64) -> Self {
    Self { secret: secret.into(), ttl: Duration::minutes(ttl_minutes) }
  }

  fn digest(&self, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&self.secret);
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl TokenIssuer for TokenSigner {
  fn sign(&self, identity: &Identity) -> slate_core::Result<String> {
    let claims = Claims {
      sub: identity.user_id,
      adm: identity.is_admin,
      exp: (Utc::now() + self.ttl).timestamp(),
    };
    let bytes = serde_json::to_vec(&claims)
      .map_err(|e| DomainError::Credential(e.to_string()))?;
    let payload = B64.encode(bytes);
    let signature = self.digest(&payload);
    Ok(format!("{payload}.{signature}"))
  }

  fn verify(&self, token: &str) -> Option<Identity> {
    let (payload, signature) = token.split_once('.')?;
    if self.digest(payload) != signature {
      return None;
    }
    let bytes = B64.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    if claims.exp < Utc::now().timestamp() {
      return None;
    }
    Some(Identity { user_id: claims.sub, is_admin: claims.adm })
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated caller; present in a handler signature means the
/// request carried a valid bearer token.
pub struct Actor(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: TimetableStore + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    let identity =
      state.tokens.verify(token).ok_or(ApiError::Unauthorized)?;
    Ok(Actor(identity))
  }
}
