//! Attribute-based access policies and the pure evaluation function.
//!
//! A policy grants or denies an `action` on a `resource` to every identity
//! whose attributes equal all entries of its `subject` map. Evaluation is a
//! single ordered pass over the candidate policies; no state is kept between
//! calls.

use std::{cmp::Ordering, collections::BTreeMap, str::FromStr as _};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  identity::{Identity, Role, SubjectAttribute},
};

/// Resource tags checked by the workflow.
pub mod resources {
  pub const RELIEF_REQUEST: &str = "page:relief_request";
  pub const POLICY: &str = "page:policy";
  pub const DASHBOARD: &str = "page:dashboard";
}

/// Action names checked by the workflow.
pub mod actions {
  pub const CREATE: &str = "create";
  pub const READ: &str = "read";
  pub const UPDATE_STATUS: &str = "update_status";
  pub const ASSIGN_VOLUNTEER: &str = "assign_volunteer";
  pub const DELETE: &str = "delete";
  pub const MANAGE: &str = "manage";
}

/// Matches any requested action.
pub const WILDCARD_ACTION: &str = "*";

// ─── Effect / Decision ───────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Effect {
  Allow,
  Deny,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Allow,
  Deny,
}

impl Decision {
  pub fn is_allow(self) -> bool { matches!(self, Self::Allow) }
}

impl From<Effect> for Decision {
  fn from(effect: Effect) -> Self {
    match effect {
      Effect::Allow => Self::Allow,
      Effect::Deny => Self::Deny,
    }
  }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Required identity attribute values. An empty map matches every identity.
pub type Subject = BTreeMap<SubjectAttribute, String>;

/// A stored access rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
  pub name:       String,
  pub resource:   String,
  pub action:     String,
  #[serde(default)]
  pub subject:    Subject,
  pub effect:     Effect,
  pub priority:   i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Policy {
  /// Whether this policy is a candidate for `(resource, action)`.
  pub fn applies_to(&self, resource: &str, action: &str) -> bool {
    self.resource == resource
      && (self.action == action || self.action == WILDCARD_ACTION)
  }

  /// Whether every subject constraint equals the identity's attribute.
  pub fn matches(&self, identity: &Identity) -> bool {
    self.subject.iter().all(|(attr, required)| {
      identity.attribute(*attr).as_deref() == Some(required.as_str())
    })
  }
}

/// Result of replacing a stored policy.
#[derive(Debug, Clone)]
pub enum PolicyUpdate {
  Updated(Policy),
  /// The new name belongs to another policy.
  NameTaken,
  NotFound,
}

/// Priority descending; at equal priority deny before allow, then by name.
fn evaluation_order(a: &&Policy, b: &&Policy) -> Ordering {
  let effect_rank = |p: &Policy| match p.effect {
    Effect::Deny => 0,
    Effect::Allow => 1,
  };
  b.priority
    .cmp(&a.priority)
    .then_with(|| effect_rank(a).cmp(&effect_rank(b)))
    .then_with(|| a.name.cmp(&b.name))
}

/// Decide whether `identity` may perform `action` on `resource`.
///
/// `policies` may contain unrelated rules; only those that
/// [apply](Policy::applies_to) are considered. A Super User is always
/// allowed. Without at least one applicable ALLOW policy the answer is deny,
/// whatever DENY policies exist. Otherwise the first matching policy in
/// priority order decides, and no match means deny.
pub fn decide(
  identity: &Identity,
  resource: &str,
  action: &str,
  policies: &[Policy],
) -> Decision {
  if identity.role == Role::SuperUser {
    return Decision::Allow;
  }

  let mut candidates: Vec<&Policy> =
    policies.iter().filter(|p| p.applies_to(resource, action)).collect();

  if !candidates.iter().any(|p| p.effect == Effect::Allow) {
    return Decision::Deny;
  }

  candidates.sort_by(evaluation_order);
  candidates
    .into_iter()
    .find(|p| p.matches(identity))
    .map(|p| Decision::from(p.effect))
    .unwrap_or(Decision::Deny)
}

// ─── NewPolicy ───────────────────────────────────────────────────────────────

/// Input to policy creation and replacement. Timestamps are store-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicy {
  pub name:     String,
  pub resource: String,
  pub action:   String,
  #[serde(default)]
  pub subject:  Subject,
  pub effect:   Effect,
  #[serde(default)]
  pub priority: i32,
}

impl NewPolicy {
  pub fn new(
    name: impl Into<String>,
    resource: impl Into<String>,
    action: impl Into<String>,
    effect: Effect,
  ) -> Self {
    Self {
      name: name.into(),
      resource: resource.into(),
      action: action.into(),
      subject: Subject::new(),
      effect,
      priority: 0,
    }
  }

  pub fn with_subject(mut self, attr: SubjectAttribute, value: impl Into<String>) -> Self {
    self.subject.insert(attr, value.into());
    self
  }

  pub fn with_priority(mut self, priority: i32) -> Self {
    self.priority = priority;
    self
  }

  /// Reject policies that could never be evaluated meaningfully.
  ///
  /// Subject keys are already restricted to [`SubjectAttribute`]; values
  /// for `role` and `id` must parse as a [`Role`] and a UUID respectively.
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("name", &self.name),
      ("resource", &self.resource),
      ("action", &self.action),
    ] {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("policy {field} must not be empty")));
      }
    }

    for (attr, value) in &self.subject {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!(
          "policy subject `{attr}` must not be empty"
        )));
      }
      match attr {
        SubjectAttribute::Role => {
          let role = Role::from_str(value).map_err(|_| {
            Error::Validation(format!("unknown role in policy subject: {value:?}"))
          })?;
          // Stored in canonical form so equality against Identity works.
          if role.to_string() != *value {
            return Err(Error::Validation(format!(
              "policy subject role must be written as {:?}",
              role.to_string()
            )));
          }
        }
        SubjectAttribute::Id => {
          let id = Uuid::parse_str(value).map_err(|_| {
            Error::Validation(format!("policy subject id is not a UUID: {value:?}"))
          })?;
          if id.hyphenated().to_string() != *value {
            return Err(Error::Validation(format!(
              "policy subject id must be a lowercase hyphenated UUID: {value:?}"
            )));
          }
        }
        SubjectAttribute::District
        | SubjectAttribute::DsDivision
        | SubjectAttribute::GnDivision => {}
      }
    }

    Ok(())
  }
}

// ─── Defaults ────────────────────────────────────────────────────────────────

/// The policy set installed on a fresh deployment.
///
/// Super Users need no entries; everyone else is granted the operations
/// their tier performs. Geographic narrowing is left to the scope guard.
pub fn default_policies() -> Vec<NewPolicy> {
  use actions::*;
  use resources::*;

  let grant = |action: &str, role: Role, resource: &str| {
    NewPolicy::new(
      format!("{resource}:{action}:{}", role.to_string().to_lowercase().replace(' ', "_")),
      resource,
      action,
      Effect::Allow,
    )
    .with_subject(SubjectAttribute::Role, role.to_string())
    .with_priority(10)
  };

  let mut out = Vec::new();

  for role in [
    Role::NationalOfficer,
    Role::DistrictOfficer,
    Role::DivisionOfficer,
    Role::GnOfficer,
    Role::UnVolunteer,
  ] {
    out.push(grant(READ, role, RELIEF_REQUEST));
    out.push(grant(CREATE, role, RELIEF_REQUEST));
  }
  for role in [Role::NationalOfficer, Role::DistrictOfficer, Role::DivisionOfficer] {
    out.push(grant(UPDATE_STATUS, role, RELIEF_REQUEST));
    out.push(grant(READ, role, DASHBOARD));
  }
  out.push(grant(ASSIGN_VOLUNTEER, Role::NationalOfficer, RELIEF_REQUEST));
  out.push(grant(DELETE, Role::NationalOfficer, RELIEF_REQUEST));

  out
}
