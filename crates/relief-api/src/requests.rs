//! Handlers for `/relief-requests` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/relief-requests` | Optional `?status=pending\|approved\|rejected` |
//! | `POST`   | `/relief-requests` | Body: request details plus optional `media` |
//! | `GET`    | `/relief-requests/{id}` | 404 if absent or outside the caller's area |
//! | `DELETE` | `/relief-requests/{id}` | Soft delete |
//! | `POST`   | `/relief-requests/{id}/status` | Body: `{"status":"approved","remarks":"…"}` |
//! | `POST`   | `/relief-requests/{id}/volunteer` | Body: `{"volunteer_id":"…"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use relief_core::{
  ReliefService,
  request::{NewMedia, ReliefDetails, ReliefRequest, RequestStatus},
  store::ReliefStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{ApiPath, ApiQuery, JsonBody},
  identity::Caller,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<RequestStatus>,
}

/// `GET /relief-requests[?status=<status>]`
pub async fn list<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<ReliefRequest>>, ApiError> {
  let requests = service.list_relief_requests(&identity, params.status).await?;
  Ok(Json(requests))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(flatten)]
  pub details: ReliefDetails,
  #[serde(default)]
  pub media:   Vec<NewMedia>,
}

/// `POST /relief-requests`
pub async fn create<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let request = service
    .create_relief_request(&identity, body.details, body.media)
    .await?;
  Ok((StatusCode::CREATED, Json(request)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /relief-requests/{id}`
pub async fn get_one<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ReliefRequest>, ApiError> {
  Ok(Json(service.get_relief_request(&identity, id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /relief-requests/{id}`
pub async fn delete_one<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
  service.delete_relief_request(&identity, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status:  RequestStatus,
  #[serde(default)]
  pub remarks: Option<String>,
}

/// `POST /relief-requests/{id}/status`
pub async fn update_status<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(id): ApiPath<Uuid>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<ReliefRequest>, ApiError> {
  let request = service
    .update_relief_request_status(&identity, id, body.status, body.remarks)
    .await?;
  Ok(Json(request))
}

// ─── Volunteer ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VolunteerBody {
  pub volunteer_id: Uuid,
}

/// `POST /relief-requests/{id}/volunteer`
pub async fn assign_volunteer<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
  ApiPath(id): ApiPath<Uuid>,
  JsonBody(body): JsonBody<VolunteerBody>,
) -> Result<Json<ReliefRequest>, ApiError> {
  let request = service
    .assign_volunteer(&identity, id, body.volunteer_id)
    .await?;
  Ok(Json(request))
}
