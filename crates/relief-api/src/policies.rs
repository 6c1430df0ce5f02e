//! Handlers for `/policies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/policies/evaluate` | Body: `{"resource":"…","action":"…"}` |
//! | `GET`    | `/policies` | |
//! | `POST`   | `/policies` | Body: a policy; 409 if the name is taken |
//! | `GET`    | `/policies/{name}` | |
//! | `PUT`    | `/policies/{name}` | Replaces the policy; may rename it |
//! | `DELETE` | `/policies/{name}` | |
//!
//! Everything but `evaluate` requires the `manage` grant on `page:policy`.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use relief_core::{
  ReliefService,
  policy::{Decision, NewPolicy, Policy},
  store::ReliefStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{ApiPath, JsonBody},
  identity::Caller,
};

// ─── Evaluate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
  pub resource: String,
  pub action:   String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
  pub decision: Decision,
  pub allowed:  bool,
}

/// `POST /policies/evaluate`. A deny is a normal answer, not an error.
pub async fn evaluate<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  caller: Option<Caller>,
  JsonBody(body): JsonBody<EvaluateBody>,
) -> Result<Json<EvaluateResponse>, ApiError> {
  if body.resource.trim().is_empty() || body.action.trim().is_empty() {
    return Err(ApiError::BadRequest("resource and action are required".into()));
  }
  let identity = caller.map(|Caller(identity)| identity);
  let decision = service
    .evaluate_policy(identity.as_ref(), &body.resource, &body.action)
    .await?;
  Ok(Json(EvaluateResponse { decision, allowed: decision.is_allow() }))
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

/// `GET /policies`
pub async fn list<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
) -> Result<Json<Vec<Policy>>, ApiError> {
  Ok(Json(service.list_policies(&identity).await?))
}

/// `POST /policies`
pub async fn create<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  JsonBody(body): JsonBody<NewPolicy>,
) -> Result<impl IntoResponse, ApiError> {
  let policy = service.create_policy(&identity, body).await?;
  Ok((StatusCode::CREATED, Json(policy)))
}

/// `GET /policies/{name}`
pub async fn get_one<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(name): ApiPath<String>,
) -> Result<Json<Policy>, ApiError> {
  Ok(Json(service.get_policy(&identity, &name).await?))
}

/// `PUT /policies/{name}`
pub async fn update<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(name): ApiPath<String>,
  JsonBody(body): JsonBody<NewPolicy>,
) -> Result<Json<Policy>, ApiError> {
  Ok(Json(service.update_policy(&identity, &name, body).await?))
}

/// `DELETE /policies/{name}`
pub async fn delete_one<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(name): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
  service.delete_policy(&identity, &name).await?;
  Ok(StatusCode::NO_CONTENT)
}
