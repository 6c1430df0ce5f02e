//! Duplicate-submission detection.
//!
//! Before a request is stored it is cross-referenced against active
//! (pending or approved) requests by two independent keys, in order:
//!
//! 1. the account holder's NIC;
//! 2. the household together with the incident type.
//!
//! The first key that matches is the only one recorded. Rejected requests are
//! never matched, so a household may resubmit after a rejection.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{request::ReliefDetails, store::ReliefStore};

/// Which key linked a submission to an existing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuplicateReason {
  Nic { account_nic: String },
  HouseholdIncident { household_id: String, incident_type: String },
}

impl fmt::Display for DuplicateReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Nic { account_nic } => {
        write!(f, "an active request already exists for NIC {account_nic}")
      }
      Self::HouseholdIncident { household_id, incident_type } => write!(
        f,
        "an active request already exists for household {household_id} \
         and incident {incident_type}"
      ),
    }
  }
}

/// A probable repeat of an existing active request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMatch {
  pub original_request_id: Uuid,
  pub reason:              DuplicateReason,
}

/// Look for an active request that `details` repeats.
pub async fn detect<S>(
  store: &S,
  details: &ReliefDetails,
) -> Result<Option<DuplicateMatch>, S::Error>
where
  S: ReliefStore,
{
  let by_nic = store
    .find_active_by_nic(details.account_nic.clone())
    .await?
    .filter(|existing| existing.status.is_active());
  if let Some(existing) = by_nic {
    return Ok(Some(DuplicateMatch {
      original_request_id: existing.id,
      reason:              DuplicateReason::Nic {
        account_nic: details.account_nic.clone(),
      },
    }));
  }

  let by_household = store
    .find_active_by_household(details.household_id.clone(), details.incident_type.clone())
    .await?
    .filter(|existing| existing.status.is_active());

  Ok(by_household.map(|existing| DuplicateMatch {
    original_request_id: existing.id,
    reason:              DuplicateReason::HouseholdIncident {
      household_id:  details.household_id.clone(),
      incident_type: details.incident_type.clone(),
    },
  }))
}
