//! The `ReliefStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `relief-store-sqlite`).
//! The workflow in [`crate::workflow`] depends on this abstraction, not on any
//! concrete backend.

use std::{collections::BTreeMap, future::Future};

use uuid::Uuid;

use crate::{
  policy::{NewPolicy, Policy, PolicyUpdate},
  request::{
    DistrictStats, NewReliefRequest, ReliefRequest, RequestStatus, StatusChange,
    StatusUpdate,
  },
  scope::Scope,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ReliefStore::list_requests`]. Filters combine with AND.
#[derive(Debug, Clone)]
pub struct RequestQuery {
  pub scope:  Scope,
  pub status: Option<RequestStatus>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Lets the workflow tell passing backend failures (a busy database, a
/// dropped connection) from permanent ones. Only transient errors are
/// retried.
pub trait Transient {
  fn is_transient(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relief workflow's persistent state.
///
/// Soft-deleted requests are invisible to every read, including duplicate
/// lookups and statistics.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReliefStore: Send + Sync {
  type Error: std::error::Error + Transient + Send + Sync + 'static;

  // ── Policies ──────────────────────────────────────────────────────────

  fn list_policies(
    &self,
  ) -> impl Future<Output = Result<Vec<Policy>, Self::Error>> + Send + '_;

  fn get_policy(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Policy>, Self::Error>> + Send + '_;

  /// Policies on `resource` whose action is `action` or `*`, highest
  /// priority first. Both effects are returned.
  fn policies_for(
    &self,
    resource: String,
    action: String,
  ) -> impl Future<Output = Result<Vec<Policy>, Self::Error>> + Send + '_;

  /// Insert a policy. Returns `None` if the name is already taken.
  fn create_policy(
    &self,
    input: NewPolicy,
  ) -> impl Future<Output = Result<Option<Policy>, Self::Error>> + Send + '_;

  /// Replace the policy called `name`. `input.name` may rename it; the
  /// clash check and the write happen in one transaction.
  fn update_policy(
    &self,
    name: String,
    input: NewPolicy,
  ) -> impl Future<Output = Result<PolicyUpdate, Self::Error>> + Send + '_;

  /// Returns `false` if no policy had that name.
  fn delete_policy(
    &self,
    name: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Relief requests ───────────────────────────────────────────────────

  /// Persist a request together with its media in one write. Status starts
  /// as `pending`; duplicate fields come from `input.duplicate`.
  fn insert_request(
    &self,
    input: NewReliefRequest,
  ) -> impl Future<Output = Result<ReliefRequest, Self::Error>> + Send + '_;

  fn get_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReliefRequest>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_requests(
    &self,
    query: RequestQuery,
  ) -> impl Future<Output = Result<Vec<ReliefRequest>, Self::Error>> + Send + '_;

  /// Oldest active (pending or approved) request with this NIC.
  fn find_active_by_nic(
    &self,
    account_nic: String,
  ) -> impl Future<Output = Result<Option<ReliefRequest>, Self::Error>> + Send + '_;

  /// Oldest active request for this household and incident type.
  fn find_active_by_household(
    &self,
    household_id: String,
    incident_type: String,
  ) -> impl Future<Output = Result<Option<ReliefRequest>, Self::Error>> + Send + '_;

  /// Move a pending request to `change.status`, writing status, remarks and
  /// `action_by` as one record update. Never touches a non-pending request.
  fn set_status(
    &self,
    id: Uuid,
    change: StatusChange,
  ) -> impl Future<Output = Result<StatusUpdate, Self::Error>> + Send + '_;

  /// Returns `None` if the request does not exist.
  fn assign_volunteer(
    &self,
    id: Uuid,
    volunteer_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReliefRequest>, Self::Error>> + Send + '_;

  /// Mark a request deleted. Returns `false` if it was absent or already
  /// deleted.
  fn soft_delete_request(
    &self,
    id: Uuid,
    deleted_by: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Counts grouped by district and status.
  fn district_stats(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<String, DistrictStats>, Self::Error>>
  + Send
  + '_;
}
