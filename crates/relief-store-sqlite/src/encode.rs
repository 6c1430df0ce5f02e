//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed microsecond precision, so
//! they sort lexically in time order. Calendar dates are `YYYY-MM-DD`.
//! UUIDs are hyphenated lowercase strings. Policy subjects are compact JSON.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use relief_core::{
  policy::{Effect, Policy, Subject},
  request::{ReliefDetails, ReliefRequest, ReliefRequestMedia, RequestStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<RequestStatus> { decode_enum("status", s) }

pub fn decode_effect(s: &str) -> Result<Effect> { decode_enum("effect", s) }

pub fn encode_subject(subject: &Subject) -> Result<String> {
  Ok(serde_json::to_string(subject)?)
}

pub fn decode_subject(s: &str) -> Result<Subject> { Ok(serde_json::from_str(s)?) }

pub fn encode_amount(amount: u64) -> Result<i64> {
  i64::try_from(amount).map_err(|_| Error::OutOfRange(format!("relief amount {amount}")))
}

pub fn decode_amount(amount: i64) -> Result<u64> {
  u64::try_from(amount).map_err(|_| Error::OutOfRange(format!("relief amount {amount}")))
}

// ─── Policy rows ─────────────────────────────────────────────────────────────

pub const POLICY_COLUMNS: &str =
  "name, resource, action, subject_json, effect, priority, created_at, updated_at";

/// Raw values read directly from a `policies` row.
pub struct RawPolicy {
  pub name:         String,
  pub resource:     String,
  pub action:       String,
  pub subject_json: String,
  pub effect:       String,
  pub priority:     i32,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawPolicy {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      name:         row.get("name")?,
      resource:     row.get("resource")?,
      action:       row.get("action")?,
      subject_json: row.get("subject_json")?,
      effect:       row.get("effect")?,
      priority:     row.get("priority")?,
      created_at:   row.get("created_at")?,
      updated_at:   row.get("updated_at")?,
    })
  }

  pub fn into_policy(self) -> Result<Policy> {
    Ok(Policy {
      name:       self.name,
      resource:   self.resource,
      action:     self.action,
      subject:    decode_subject(&self.subject_json)?,
      effect:     decode_effect(&self.effect)?,
      priority:   self.priority,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Request rows ────────────────────────────────────────────────────────────

pub const REQUEST_COLUMNS: &str = "
  request_id, gn_id, gn_division, ds_division, district, household_id,
  census_block, census_unit, incident_type, start_date, end_date,
  ownership_status, is_estate, damage_zone, damage_severity, relief_amount,
  bank_name, branch_name, account_holder, account_number, account_nic,
  status, remarks, is_duplicate, duplicate_reason, original_request_id,
  data_entered_by, action_by, assigned_volunteer_id, created_at, updated_at";

/// Raw values read directly from a `relief_requests` row.
pub struct RawRequest {
  pub request_id:            String,
  pub gn_id:                 Option<String>,
  pub gn_division:           String,
  pub ds_division:           String,
  pub district:              String,
  pub household_id:          String,
  pub census_block:          Option<String>,
  pub census_unit:           Option<String>,
  pub incident_type:         String,
  pub start_date:            String,
  pub end_date:              Option<String>,
  pub ownership_status:      Option<String>,
  pub is_estate:             bool,
  pub damage_zone:           Option<String>,
  pub damage_severity:       Option<String>,
  pub relief_amount:         i64,
  pub bank_name:             String,
  pub branch_name:           Option<String>,
  pub account_holder:        String,
  pub account_number:        String,
  pub account_nic:           String,
  pub status:                String,
  pub remarks:               Option<String>,
  pub is_duplicate:          bool,
  pub duplicate_reason:      Option<String>,
  pub original_request_id:   Option<String>,
  pub data_entered_by:       String,
  pub action_by:             Option<String>,
  pub assigned_volunteer_id: Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:            row.get("request_id")?,
      gn_id:                 row.get("gn_id")?,
      gn_division:           row.get("gn_division")?,
      ds_division:           row.get("ds_division")?,
      district:              row.get("district")?,
      household_id:          row.get("household_id")?,
      census_block:          row.get("census_block")?,
      census_unit:           row.get("census_unit")?,
      incident_type:         row.get("incident_type")?,
      start_date:            row.get("start_date")?,
      end_date:              row.get("end_date")?,
      ownership_status:      row.get("ownership_status")?,
      is_estate:             row.get("is_estate")?,
      damage_zone:           row.get("damage_zone")?,
      damage_severity:       row.get("damage_severity")?,
      relief_amount:         row.get("relief_amount")?,
      bank_name:             row.get("bank_name")?,
      branch_name:           row.get("branch_name")?,
      account_holder:        row.get("account_holder")?,
      account_number:        row.get("account_number")?,
      account_nic:           row.get("account_nic")?,
      status:                row.get("status")?,
      remarks:               row.get("remarks")?,
      is_duplicate:          row.get("is_duplicate")?,
      duplicate_reason:      row.get("duplicate_reason")?,
      original_request_id:   row.get("original_request_id")?,
      data_entered_by:       row.get("data_entered_by")?,
      action_by:             row.get("action_by")?,
      assigned_volunteer_id: row.get("assigned_volunteer_id")?,
      created_at:            row.get("created_at")?,
      updated_at:            row.get("updated_at")?,
    })
  }

  pub fn into_request(self, media: Vec<RawMedia>) -> Result<ReliefRequest> {
    let decode_opt_uuid =
      |s: Option<String>| s.as_deref().map(decode_uuid).transpose();

    let details = ReliefDetails {
      gn_id:            self.gn_id,
      gn_division:      self.gn_division,
      ds_division:      self.ds_division,
      district:         self.district,
      household_id:     self.household_id,
      census_block:     self.census_block,
      census_unit:      self.census_unit,
      incident_type:    self.incident_type,
      start_date:       decode_date(&self.start_date)?,
      end_date:         self.end_date.as_deref().map(decode_date).transpose()?,
      ownership_status: self.ownership_status,
      is_estate:        self.is_estate,
      damage_zone:      self.damage_zone,
      damage_severity:  self.damage_severity,
      relief_amount:    decode_amount(self.relief_amount)?,
      bank_name:        self.bank_name,
      branch_name:      self.branch_name,
      account_holder:   self.account_holder,
      account_number:   self.account_number,
      account_nic:      self.account_nic,
    };

    Ok(ReliefRequest {
      id: decode_uuid(&self.request_id)?,
      details,
      status: decode_status(&self.status)?,
      remarks: self.remarks,
      is_duplicate: self.is_duplicate,
      duplicate_reason: self.duplicate_reason,
      original_request_id: decode_opt_uuid(self.original_request_id)?,
      data_entered_by: decode_uuid(&self.data_entered_by)?,
      action_by: decode_opt_uuid(self.action_by)?,
      assigned_volunteer_id: decode_opt_uuid(self.assigned_volunteer_id)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      media: media.into_iter().map(RawMedia::into_media).collect::<Result<_>>()?,
    })
  }
}

// ─── Media rows ──────────────────────────────────────────────────────────────

pub const MEDIA_COLUMNS: &str =
  "media_id, request_id, file_url, file_type, original_name, created_at";

/// Raw values read directly from a `relief_request_media` row.
pub struct RawMedia {
  pub media_id:      String,
  pub request_id:    String,
  pub file_url:      String,
  pub file_type:     String,
  pub original_name: String,
  pub created_at:    String,
}

impl RawMedia {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      media_id:      row.get("media_id")?,
      request_id:    row.get("request_id")?,
      file_url:      row.get("file_url")?,
      file_type:     row.get("file_type")?,
      original_name: row.get("original_name")?,
      created_at:    row.get("created_at")?,
    })
  }

  pub fn into_media(self) -> Result<ReliefRequestMedia> {
    Ok(ReliefRequestMedia {
      media_id:      decode_uuid(&self.media_id)?,
      request_id:    decode_uuid(&self.request_id)?,
      file_url:      self.file_url,
      file_type:     self.file_type,
      original_name: self.original_name,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
