//! JSON REST API for Slate.
//!
//! Exposes an axum [`Router`] backed by any
//! [`slate_core::store::TimetableStore`]. TLS and process supervision are
//! the caller's responsibility.

pub mod auth;
pub mod error;
pub mod schedules;
pub mod subjects;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Deserialize;

use slate_core::{
  service::{ScheduleService, SubjectService, UserService},
  store::TimetableStore,
};

use auth::TokenSigner;
pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_token_ttl() -> i64 { 60 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Key for the signed bearer tokens; rotating it invalidates sessions.
  pub token_secret: String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_minutes: i64,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: TimetableStore> {
  pub users:     Arc<UserService<S>>,
  pub subjects:  Arc<SubjectService<S>>,
  pub schedules: Arc<ScheduleService<S>>,
  pub tokens:    Arc<TokenSigner>,
}

impl<S: TimetableStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      users:     self.users.clone(),
      subjects:  self.subjects.clone(),
      schedules: self.schedules.clone(),
      tokens:    self.tokens.clone(),
    }
  }
}

impl<S: TimetableStore> AppState<S> {
  /// Wire the services over `store` with the production argon2 hasher.
  pub fn new(store: Arc<S>, tokens: Arc<TokenSigner>) -> Self {
    let hasher = Arc::new(auth::Argon2Hasher);
    Self {
      users: Arc::new(UserService::new(store.clone(), hasher)),
      subjects: Arc::new(SubjectService::new(store.clone())),
      schedules: Arc::new(ScheduleService::new(store)),
      tokens,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TimetableStore + Send + Sync + 'static,
{
  Router::new()
    // Accounts
    .route("/register", post(users::register::<S>))
    .route("/login", post(users::login::<S>))
    .route("/users", get(users::list::<S>))
    .route("/users/with-schedules", get(users::list_with_schedules::<S>))
    .route("/users/me", get(users::me::<S>))
    .route("/users/{id}", axum::routing::delete(users::delete_one::<S>))
    .route("/users/{id}/username", put(users::update_username::<S>))
    .route("/users/{id}/password", put(users::update_password::<S>))
    // Subject catalog
    .route(
      "/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::update::<S>)
        .delete(subjects::delete_one::<S>),
    )
    .route("/subjects/name/{name}", get(subjects::get_by_name::<S>))
    .route(
      "/subjects/instructor/{instructor}",
      get(subjects::list_by_instructor::<S>),
    )
    .route("/subjects/day/{day}", get(subjects::list_by_day::<S>))
    .route("/subjects/block/{block}", get(subjects::list_by_block::<S>))
    .route(
      "/subjects/classroom/{room}",
      get(subjects::list_by_classroom::<S>),
    )
    // Schedules
    .route("/schedules", post(schedules::create::<S>))
    .route(
      "/schedules/{id}",
      get(schedules::get_one::<S>).delete(schedules::delete_one::<S>),
    )
    .route("/schedules/user/{id}", get(schedules::list_for_user::<S>))
    .route("/schedules/{id}/rename", put(schedules::rename::<S>))
    .route("/schedules/{id}/subjects", post(schedules::add_subject::<S>))
    .route(
      "/schedules/{id}/subjects/{subject_id}",
      axum::routing::delete(schedules::remove_subject::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use slate_core::{
    auth::{CredentialHasher as _, Identity, TokenIssuer as _},
    user::NewUser,
  };
  use slate_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  struct TestCtx {
    state: AppState<SqliteStore>,
    store: Arc<SqliteStore>,
  }

  async fn ctx() -> TestCtx {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let tokens = Arc::new(TokenSigner::new("test-secret", 60));
    TestCtx { state: AppState::new(store.clone(), tokens), store }
  }

  /// Create an admin account directly in the store (registration can't)
  /// and mint a token for it.
  async fn admin_token(ctx: &TestCtx) -> String {
    use slate_core::store::TimetableStore as _;
    let hash = auth::Argon2Hasher.hash_password("@adm1n").unwrap();
    let admin = ctx
      .store
      .create_user(NewUser {
        username:      "admin".to_string(),
        password_hash: hash,
        is_admin:      true,
      })
      .await
      .unwrap();
    ctx
      .state
      .tokens
      .sign(&Identity { user_id: admin.user_id, is_admin: true })
      .unwrap()
  }

  async fn send(
    ctx: &TestCtx,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder =
        builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(value) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(ctx.state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Accounts ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_me_flow() {
    let ctx = ctx().await;

    let resp = send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["username"], "ana");
    assert_eq!(created["is_admin"], false);
    // The hash must never appear in a response.
    assert!(created.get("password_hash").is_none());

    let resp = send(
      &ctx,
      "POST",
      "/login",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login = body_json(resp).await;
    let token = login["token"].as_str().unwrap().to_string();

    let resp = send(&ctx, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["username"], "ana");
  }

  #[tokio::test]
  async fn register_validates_input() {
    let ctx = ctx().await;
    let resp = send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "  ", "password": "secret" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn duplicate_registration_is_a_conflict() {
    let ctx = ctx().await;
    let body = json!({ "username": "ana", "password": "secret" });

    let resp = send(&ctx, "POST", "/register", None, Some(body.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&ctx, "POST", "/register", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"], "USERNAME_IN_USE");
  }

  #[tokio::test]
  async fn login_with_wrong_password_is_401() {
    let ctx = ctx().await;
    send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;

    let resp = send(
      &ctx,
      "POST",
      "/login",
      None,
      Some(json!({ "username": "ana", "password": "wrong" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "INCORRECT_PASSWORD");
  }

  #[tokio::test]
  async fn protected_routes_require_a_valid_token() {
    let ctx = ctx().await;

    let resp = send(&ctx, "GET", "/users/me", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp =
      send(&ctx, "GET", "/users/me", Some("not-a-token"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Catalog authorization ───────────────────────────────────────────────

  #[tokio::test]
  async fn subject_listing_is_public_but_writes_are_admin_only() {
    let ctx = ctx().await;

    let resp = send(&ctx, "GET", "/subjects", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;
    let login = body_json(
      send(
        &ctx,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "ana", "password": "secret" })),
      )
      .await,
    )
    .await;
    let token = login["token"].as_str().unwrap();

    let resp = send(
      &ctx,
      "POST",
      "/subjects",
      Some(token),
      Some(json!({
        "name": "POO",
        "instructor": "Otávio Lemos",
        "classes": [{ "day": 1, "block": 5, "classroom": 117 }],
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"], "NOT_AUTHORIZED");
  }

  #[tokio::test]
  async fn subject_day_route_validates_the_index() {
    let ctx = ctx().await;
    let resp = send(&ctx, "GET", "/subjects/day/9", None, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Full timetable flow ─────────────────────────────────────────────────

  async fn create_subject(
    ctx: &TestCtx,
    admin: &str,
    name: &str,
    day: u8,
    block: u8,
  ) -> String {
    let resp = send(
      ctx,
      "POST",
      "/subjects",
      Some(admin),
      Some(json!({
        "name": name,
        "instructor": "Grasiele Jorge",
        "classes": [{ "day": day, "block": block, "classroom": 302 }],
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["subject_id"].as_str().unwrap().to_string()
  }

  #[tokio::test]
  async fn conflicting_add_returns_409_with_the_pairs() {
    let ctx = ctx().await;
    let admin = admin_token(&ctx).await;

    let math = create_subject(&ctx, &admin, "Matemática", 1, 3).await;
    let oop = create_subject(&ctx, &admin, "POO", 1, 5).await;
    let calc = create_subject(&ctx, &admin, "Cálculo", 1, 3).await;

    send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;
    let login = body_json(
      send(
        &ctx,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "ana", "password": "secret" })),
      )
      .await,
    )
    .await;
    let token = login["token"].as_str().unwrap().to_string();
    let ana_id = login["user"]["user_id"].as_str().unwrap().to_string();

    let resp = send(
      &ctx,
      "POST",
      "/schedules",
      Some(&token),
      Some(json!({ "user_id": ana_id, "name": "Sem1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let schedule_id =
      body_json(resp).await["schedule_id"].as_str().unwrap().to_string();

    for subject_id in [&math, &oop] {
      let resp = send(
        &ctx,
        "POST",
        &format!("/schedules/{schedule_id}/subjects"),
        Some(&token),
        Some(json!({ "subject_id": subject_id })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = send(
      &ctx,
      "POST",
      &format!("/schedules/{schedule_id}/subjects"),
      Some(&token),
      Some(json!({ "subject_id": calc })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "CONFLICTS_FOUND");
    assert_eq!(body["conflicts"][0]["subject_name"], "Matemática");

    // The schedule still holds exactly the two clean subjects.
    let resp = send(
      &ctx,
      "GET",
      &format!("/schedules/{schedule_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let schedule = body_json(resp).await;
    assert_eq!(schedule["subjects"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn schedules_of_other_users_are_not_accessible() {
    let ctx = ctx().await;

    for name in ["ana", "bob"] {
      send(
        &ctx,
        "POST",
        "/register",
        None,
        Some(json!({ "username": name, "password": "secret" })),
      )
      .await;
    }
    let ana = body_json(
      send(
        &ctx,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "ana", "password": "secret" })),
      )
      .await,
    )
    .await;
    let bob = body_json(
      send(
        &ctx,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "bob", "password": "secret" })),
      )
      .await,
    )
    .await;
    let ana_token = ana["token"].as_str().unwrap();
    let ana_id = ana["user"]["user_id"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let resp = send(
      &ctx,
      "POST",
      "/schedules",
      Some(ana_token),
      Some(json!({ "user_id": ana_id, "name": "Sem1" })),
    )
    .await;
    let schedule_id =
      body_json(resp).await["schedule_id"].as_str().unwrap().to_string();

    let resp = send(
      &ctx,
      "GET",
      &format!("/schedules/{schedule_id}"),
      Some(bob_token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(
      &ctx,
      "GET",
      &format!("/schedules/user/{ana_id}"),
      Some(bob_token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn admin_listings_and_user_deletion() {
    let ctx = ctx().await;
    let admin = admin_token(&ctx).await;

    send(
      &ctx,
      "POST",
      "/register",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;

    let resp = send(&ctx, "GET", "/users", Some(&admin), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users = body_json(resp).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let ana_id = users
      .as_array()
      .unwrap()
      .iter()
      .find(|u| u["username"] == "ana")
      .unwrap()["user_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      &ctx,
      "DELETE",
      &format!("/users/{ana_id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
      &ctx,
      "POST",
      "/login",
      None,
      Some(json!({ "username": "ana", "password": "secret" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
