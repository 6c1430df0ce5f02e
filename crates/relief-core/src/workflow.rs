//! [`ReliefService`]: gated operations over a [`ReliefStore`].
//!
//! Every operation takes the verified caller, asks the policy evaluator for
//! permission, narrows or checks records with the geographic [`Scope`], and
//! only then touches the store. Reads and repeatable writes go through the
//! configured [`RetryPolicy`]; inserts run once. Anything the store still
//! cannot do becomes [`Error::Internal`].

use std::{collections::BTreeMap, future::Future, sync::Arc};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result, duplicate,
  identity::{Identity, Role},
  policy::{self, Decision, NewPolicy, Policy, PolicyUpdate, actions, resources},
  request::{
    DistrictStats, NewMedia, NewReliefRequest, ReliefDetails, ReliefRequest,
    RequestStatus, StatusChange, StatusUpdate,
  },
  retry::RetryPolicy,
  scope::Scope,
  store::{ReliefStore, RequestQuery},
};

/// The relief-request workflow. Cheap to share behind an `Arc`; holds no
/// per-request state.
pub struct ReliefService<S> {
  store: Arc<S>,
  retry: RetryPolicy,
}

impl<S: ReliefStore> ReliefService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, retry: RetryPolicy::default() } }

  pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  /// Run a store call under the retry policy.
  async fn call<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, S::Error>>,
  {
    self.retry.run(operation, op).await.map_err(|e| {
      error!(operation, error = %e, "store failure");
      Error::internal(e)
    })
  }

  /// Run a store call that must not be repeated, such as an insert that
  /// may have committed before its error surfaced.
  async fn call_once<T, Fut>(&self, operation: &'static str, fut: Fut) -> Result<T>
  where
    Fut: Future<Output = Result<T, S::Error>>,
  {
    fut.await.map_err(|e| {
      error!(operation, error = %e, "store failure");
      Error::internal(e)
    })
  }

  // ─── Policy evaluation ─────────────────────────────────────────────────────

  /// Decide whether `identity` may perform `action` on `resource`.
  ///
  /// A missing identity is [`Error::Unauthenticated`], not a deny.
  pub async fn evaluate_policy(
    &self,
    identity: Option<&Identity>,
    resource: &str,
    action: &str,
  ) -> Result<Decision> {
    let identity = identity.ok_or(Error::Unauthenticated)?;
    if identity.role == Role::SuperUser {
      return Ok(Decision::Allow);
    }

    let policies = self
      .call("policies_for", || {
        self.store.policies_for(resource.to_owned(), action.to_owned())
      })
      .await?;

    let decision = policy::decide(identity, resource, action, &policies);
    debug!(
      caller = %identity.id,
      role = %identity.role,
      resource,
      action,
      candidates = policies.len(),
      ?decision,
      "policy evaluated"
    );
    Ok(decision)
  }

  async fn authorize(&self, identity: &Identity, resource: &str, action: &str) -> Result<()> {
    match self.evaluate_policy(Some(identity), resource, action).await? {
      Decision::Allow => Ok(()),
      Decision::Deny => {
        warn!(caller = %identity.id, role = %identity.role, resource, action, "denied by policy");
        Err(Error::Forbidden(format!("{} may not {action} {resource}", identity.role)))
      }
    }
  }

  // ─── Relief requests ───────────────────────────────────────────────────────

  async fn fetch(&self, id: Uuid) -> Result<Option<ReliefRequest>> {
    self.call("get_request", || self.store.get_request(id)).await
  }

  /// Load a request the caller is about to change, enforcing scope.
  async fn fetch_for_mutation(&self, identity: &Identity, id: Uuid) -> Result<ReliefRequest> {
    let current = self.fetch(id).await?.ok_or(Error::RequestNotFound(id))?;
    if !Scope::for_identity(identity).permits(&current) {
      warn!(caller = %identity.id, role = %identity.role, request_id = %id, "outside caller's area");
      return Err(Error::Forbidden(format!("relief request {id} is outside your area")));
    }
    Ok(current)
  }

  /// Submit a new request.
  ///
  /// If it repeats an active request, ground-level callers get it stored as
  /// a flagged duplicate for review; any other caller gets
  /// [`Error::DuplicateConflict`] and nothing is stored.
  pub async fn create_relief_request(
    &self,
    identity: &Identity,
    details: ReliefDetails,
    media: Vec<NewMedia>,
  ) -> Result<ReliefRequest> {
    debug!(
      caller = %identity.id,
      household = %details.household_id,
      incident = %details.incident_type,
      "creating relief request"
    );
    self.authorize(identity, resources::RELIEF_REQUEST, actions::CREATE).await?;

    details.validate()?;
    for m in &media {
      m.validate()?;
    }

    // Check-then-insert is not atomic; concurrent twins can both land
    // unflagged and are left to reviewers.
    let duplicate = self
      .call("detect_duplicate", || duplicate::detect(&*self.store, &details))
      .await?;

    if let Some(found) = &duplicate {
      if !identity.role.is_ground_level() {
        warn!(
          caller = %identity.id,
          role = %identity.role,
          original = %found.original_request_id,
          reason = %found.reason,
          "duplicate submission refused"
        );
        return Err(Error::DuplicateConflict(found.clone()));
      }
      warn!(
        original = %found.original_request_id,
        reason = %found.reason,
        "flagging duplicate submission for review"
      );
    }

    let input = NewReliefRequest {
      details,
      media,
      data_entered_by: identity.id,
      duplicate,
    };
    let request = self
      .call_once("insert_request", self.store.insert_request(input))
      .await?;

    info!(
      request_id = %request.id,
      is_duplicate = request.is_duplicate,
      "relief request created"
    );
    Ok(request)
  }

  /// Requests visible to the caller, newest first, optionally of one status.
  pub async fn list_relief_requests(
    &self,
    identity: &Identity,
    status: Option<RequestStatus>,
  ) -> Result<Vec<ReliefRequest>> {
    self.authorize(identity, resources::RELIEF_REQUEST, actions::READ).await?;

    let scope = Scope::for_identity(identity);
    let query = RequestQuery { scope: scope.clone(), status };
    let mut requests = self
      .call("list_requests", || self.store.list_requests(query.clone()))
      .await?;

    requests.retain(|r| scope.permits(r) && status.is_none_or(|s| r.status == s));
    debug!(caller = %identity.id, ?scope, count = requests.len(), "listed relief requests");
    Ok(requests)
  }

  /// A single request. Out-of-scope and deleted requests are not found.
  pub async fn get_relief_request(&self, identity: &Identity, id: Uuid) -> Result<ReliefRequest> {
    self.authorize(identity, resources::RELIEF_REQUEST, actions::READ).await?;

    self
      .fetch(id)
      .await?
      .filter(|r| Scope::for_identity(identity).permits(r))
      .ok_or(Error::RequestNotFound(id))
  }

  /// Approve or reject a pending request.
  pub async fn update_relief_request_status(
    &self,
    identity: &Identity,
    id: Uuid,
    status: RequestStatus,
    remarks: Option<String>,
  ) -> Result<ReliefRequest> {
    debug!(caller = %identity.id, request_id = %id, %status, "updating relief request status");
    self
      .authorize(identity, resources::RELIEF_REQUEST, actions::UPDATE_STATUS)
      .await?;
    if !identity.role.can_review() {
      return Err(Error::Forbidden(format!("{} may not review relief requests", identity.role)));
    }

    let current = self.fetch_for_mutation(identity, id).await?;

    let remarks = remarks.map(|r| r.trim().to_owned()).filter(|r| !r.is_empty());
    match status {
      RequestStatus::Pending => {
        return Err(Error::Validation("status must be approved or rejected".into()));
      }
      RequestStatus::Rejected if remarks.is_none() => {
        return Err(Error::Validation("a rejection requires remarks".into()));
      }
      RequestStatus::Approved | RequestStatus::Rejected => {}
    }

    if current.status.is_terminal() {
      return Err(Error::InvalidTransition { id, status: current.status });
    }

    let change = StatusChange { status, remarks, action_by: identity.id };
    match self
      .call("set_status", || self.store.set_status(id, change.clone()))
      .await?
    {
      StatusUpdate::Updated(request) => {
        info!(request_id = %id, %status, action_by = %identity.id, "relief request reviewed");
        Ok(request)
      }
      StatusUpdate::AlreadyFinal(status) => Err(Error::InvalidTransition { id, status }),
      StatusUpdate::NotFound => Err(Error::RequestNotFound(id)),
    }
  }

  /// Assign a volunteer to follow up a request. Status is left unchanged.
  pub async fn assign_volunteer(
    &self,
    identity: &Identity,
    id: Uuid,
    volunteer_id: Uuid,
  ) -> Result<ReliefRequest> {
    self
      .authorize(identity, resources::RELIEF_REQUEST, actions::ASSIGN_VOLUNTEER)
      .await?;
    if !identity.role.can_assign_volunteers() {
      return Err(Error::Forbidden(format!("{} may not assign volunteers", identity.role)));
    }

    self.fetch_for_mutation(identity, id).await?;
    let request = self
      .call("assign_volunteer", || self.store.assign_volunteer(id, volunteer_id))
      .await?
      .ok_or(Error::RequestNotFound(id))?;

    info!(request_id = %id, volunteer = %volunteer_id, "volunteer assigned");
    Ok(request)
  }

  /// Soft-delete a request. It disappears from reads, statistics and
  /// duplicate detection but stays in storage.
  pub async fn delete_relief_request(&self, identity: &Identity, id: Uuid) -> Result<()> {
    self.authorize(identity, resources::RELIEF_REQUEST, actions::DELETE).await?;
    self.fetch_for_mutation(identity, id).await?;

    let deleted = self
      .call("soft_delete_request", || self.store.soft_delete_request(id, identity.id))
      .await?;
    if !deleted {
      return Err(Error::RequestNotFound(id));
    }

    info!(request_id = %id, deleted_by = %identity.id, "relief request deleted");
    Ok(())
  }

  /// Pending / approved / rejected counts per district.
  pub async fn district_stats(&self, identity: &Identity) -> Result<BTreeMap<String, DistrictStats>> {
    self.authorize(identity, resources::DASHBOARD, actions::READ).await?;
    self.call("district_stats", || self.store.district_stats()).await
  }

  // ─── Policy administration ─────────────────────────────────────────────────

  pub async fn list_policies(&self, identity: &Identity) -> Result<Vec<Policy>> {
    self.authorize(identity, resources::POLICY, actions::MANAGE).await?;
    self.call("list_policies", || self.store.list_policies()).await
  }

  pub async fn get_policy(&self, identity: &Identity, name: &str) -> Result<Policy> {
    self.authorize(identity, resources::POLICY, actions::MANAGE).await?;
    self
      .call("get_policy", || self.store.get_policy(name.to_owned()))
      .await?
      .ok_or_else(|| Error::PolicyNotFound(name.to_owned()))
  }

  pub async fn create_policy(&self, identity: &Identity, input: NewPolicy) -> Result<Policy> {
    self.authorize(identity, resources::POLICY, actions::MANAGE).await?;
    input.validate()?;

    let name = input.name.clone();
    let created = self
      .call("create_policy", || self.store.create_policy(input.clone()))
      .await?
      .ok_or_else(|| Error::Conflict(format!("policy {name:?} already exists")))?;

    info!(policy = %created.name, by = %identity.id, "policy created");
    Ok(created)
  }

  /// Replace the policy called `name`, possibly renaming it.
  pub async fn update_policy(
    &self,
    identity: &Identity,
    name: &str,
    input: NewPolicy,
  ) -> Result<Policy> {
    self.authorize(identity, resources::POLICY, actions::MANAGE).await?;
    input.validate()?;

    let outcome = self
      .call("update_policy", || self.store.update_policy(name.to_owned(), input.clone()))
      .await?;
    let updated = match outcome {
      PolicyUpdate::Updated(policy) => policy,
      PolicyUpdate::NameTaken => {
        return Err(Error::Conflict(format!("policy {:?} already exists", input.name)));
      }
      PolicyUpdate::NotFound => return Err(Error::PolicyNotFound(name.to_owned())),
    };

    info!(policy = %updated.name, by = %identity.id, "policy updated");
    Ok(updated)
  }

  pub async fn delete_policy(&self, identity: &Identity, name: &str) -> Result<()> {
    self.authorize(identity, resources::POLICY, actions::MANAGE).await?;

    let deleted = self
      .call("delete_policy", || self.store.delete_policy(name.to_owned()))
      .await?;
    if !deleted {
      return Err(Error::PolicyNotFound(name.to_owned()));
    }

    info!(policy = name, by = %identity.id, "policy deleted");
    Ok(())
  }

  /// Install `policies` at startup, skipping names already present.
  /// Not gated; never expose this to callers. Returns how many were added.
  pub async fn bootstrap_policies(&self, policies: Vec<NewPolicy>) -> Result<usize> {
    let mut added = 0;
    for input in policies {
      input.validate()?;
      let created = self
        .call("create_policy", || self.store.create_policy(input.clone()))
        .await?;
      if created.is_some() {
        added += 1;
      }
    }
    info!(added, "bootstrap policies installed");
    Ok(added)
  }
}
