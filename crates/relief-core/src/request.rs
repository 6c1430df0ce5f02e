//! Relief requests, the records the workflow moves through review.
//!
//! A request is created `pending` and moves exactly once, to `approved` or
//! `rejected`. Records are soft-deleted only; the store never exposes a
//! deleted record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

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
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
  Pending,
  Approved,
  Rejected,
}

impl RequestStatus {
  /// `approved` and `rejected` admit no further transitions.
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }

  /// Whether a request in this status takes part in duplicate detection.
  pub fn is_active(self) -> bool { matches!(self, Self::Pending | Self::Approved) }
}

// ─── Submission payload ──────────────────────────────────────────────────────

/// Everything a field officer enters about a household's claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefDetails {
  // Location and household
  #[serde(default)]
  pub gn_id:            Option<String>,
  pub gn_division:      String,
  pub ds_division:      String,
  pub district:         String,
  pub household_id:     String,
  #[serde(default)]
  pub census_block:     Option<String>,
  #[serde(default)]
  pub census_unit:      Option<String>,

  // Incident
  pub incident_type:    String,
  pub start_date:       NaiveDate,
  #[serde(default)]
  pub end_date:         Option<NaiveDate>,

  // Property and damage
  #[serde(default)]
  pub ownership_status: Option<String>,
  #[serde(default)]
  pub is_estate:        bool,
  #[serde(default)]
  pub damage_zone:      Option<String>,
  #[serde(default)]
  pub damage_severity:  Option<String>,

  /// Entitlement in whole currency units.
  #[serde(default)]
  pub relief_amount:    u64,

  // Disbursement
  pub bank_name:        String,
  #[serde(default)]
  pub branch_name:      Option<String>,
  pub account_holder:   String,
  pub account_number:   String,
  /// National identity card number of the account holder.
  pub account_nic:      String,
}

impl ReliefDetails {
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("gn_division", &self.gn_division),
      ("ds_division", &self.ds_division),
      ("district", &self.district),
      ("household_id", &self.household_id),
      ("incident_type", &self.incident_type),
      ("bank_name", &self.bank_name),
      ("account_holder", &self.account_holder),
      ("account_number", &self.account_number),
      ("account_nic", &self.account_nic),
    ] {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
      }
    }

    if let Some(end) = self.end_date
      && end < self.start_date
    {
      return Err(Error::Validation(format!(
        "end_date {end} is before start_date {}",
        self.start_date
      )));
    }

    Ok(())
  }
}

// ─── Media ───────────────────────────────────────────────────────────────────

/// Metadata for an evidence file that has already been uploaded elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMedia {
  pub file_url:      String,
  pub file_type:     String,
  pub original_name: String,
}

impl NewMedia {
  pub fn validate(&self) -> Result<()> {
    if self.file_url.trim().is_empty() {
      return Err(Error::Validation("evidence file_url is required".into()));
    }
    Ok(())
  }
}

/// An evidence attachment owned by one relief request. Never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefRequestMedia {
  pub media_id:      Uuid,
  pub request_id:    Uuid,
  pub file_url:      String,
  pub file_type:     String,
  pub original_name: String,
  pub created_at:    DateTime<Utc>,
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// A persisted relief request with its workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefRequest {
  pub id:                    Uuid,
  #[serde(flatten)]
  pub details:               ReliefDetails,
  pub status:                RequestStatus,
  pub remarks:               Option<String>,
  pub is_duplicate:          bool,
  pub duplicate_reason:      Option<String>,
  pub original_request_id:   Option<Uuid>,
  pub data_entered_by:       Uuid,
  pub action_by:             Option<Uuid>,
  pub assigned_volunteer_id: Option<Uuid>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
  pub media:                 Vec<ReliefRequestMedia>,
}

/// Input to [`crate::store::ReliefStore::insert_request`]. The id and
/// timestamps are store-assigned.
#[derive(Debug, Clone)]
pub struct NewReliefRequest {
  pub details:         ReliefDetails,
  pub media:           Vec<NewMedia>,
  pub data_entered_by: Uuid,
  /// Set when the duplicate engine matched an active request.
  pub duplicate:       Option<crate::duplicate::DuplicateMatch>,
}

/// A reviewer's verdict, written as one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
  pub status:    RequestStatus,
  pub remarks:   Option<String>,
  pub action_by: Uuid,
}

/// Result of a conditional status update.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
  Updated(ReliefRequest),
  /// The request had already left `pending`.
  AlreadyFinal(RequestStatus),
  NotFound,
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Request counts for one district.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictStats {
  pub pending:  u64,
  pub approved: u64,
  pub rejected: u64,
  pub total:    u64,
}

impl DistrictStats {
  pub fn add(&mut self, status: RequestStatus, count: u64) {
    match status {
      RequestStatus::Pending => self.pending += count,
      RequestStatus::Approved => self.approved += count,
      RequestStatus::Rejected => self.rejected += count,
    }
    self.total += count;
  }
}
