//! The verified caller of an operation.
//!
//! An [`Identity`] is produced by an external authentication layer and is only
//! ever read here. It carries the caller's [`Role`] and the geographic
//! attributes that policies and the scope guard match against.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

// ─── Role ────────────────────────────────────────────────────────────────────

/// Position of the caller in the administrative hierarchy.
///
/// The display form is the canonical name used in policies and headers;
/// snake_case aliases are accepted when parsing.
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
pub enum Role {
  #[serde(rename = "Super User", alias = "super_user")]
  #[strum(to_string = "Super User", serialize = "super_user")]
  SuperUser,
  #[serde(rename = "National Officer", alias = "national_officer")]
  #[strum(to_string = "National Officer", serialize = "national_officer")]
  NationalOfficer,
  #[serde(rename = "District Officer", alias = "district_officer")]
  #[strum(to_string = "District Officer", serialize = "district_officer")]
  DistrictOfficer,
  #[serde(rename = "Division Officer", alias = "division_officer")]
  #[strum(to_string = "Division Officer", serialize = "division_officer")]
  DivisionOfficer,
  #[serde(rename = "GN Officer", alias = "gn_officer")]
  #[strum(to_string = "GN Officer", serialize = "gn_officer")]
  GnOfficer,
  #[serde(rename = "UN Volunteer", alias = "un_volunteer")]
  #[strum(to_string = "UN Volunteer", serialize = "un_volunteer")]
  UnVolunteer,
}

impl Role {
  /// Ground-level roles whose duplicate submissions are flagged for review
  /// instead of rejected.
  pub fn is_ground_level(self) -> bool {
    matches!(self, Self::GnOfficer | Self::UnVolunteer)
  }

  /// Roles allowed to approve or reject a relief request.
  pub fn can_review(self) -> bool {
    matches!(
      self,
      Self::DivisionOfficer
        | Self::DistrictOfficer
        | Self::NationalOfficer
        | Self::SuperUser
    )
  }

  /// Roles allowed to assign a volunteer to a relief request.
  pub fn can_assign_volunteers(self) -> bool {
    matches!(self, Self::NationalOfficer | Self::SuperUser)
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The verified, attribute-bearing representation of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:          Uuid,
  pub role:        Role,
  pub district:    Option<String>,
  pub ds_division: Option<String>,
  pub gn_division: Option<String>,
}

impl Identity {
  pub fn new(id: Uuid, role: Role) -> Self {
    Self { id, role, district: None, ds_division: None, gn_division: None }
  }

  pub fn with_district(mut self, district: impl Into<String>) -> Self {
    self.district = Some(district.into());
    self
  }

  pub fn with_ds_division(mut self, ds_division: impl Into<String>) -> Self {
    self.ds_division = Some(ds_division.into());
    self
  }

  pub fn with_gn_division(mut self, gn_division: impl Into<String>) -> Self {
    self.gn_division = Some(gn_division.into());
    self
  }

  /// The string value of a policy subject attribute, if the caller has one.
  pub fn attribute(&self, attr: SubjectAttribute) -> Option<String> {
    match attr {
      SubjectAttribute::Id => Some(self.id.hyphenated().to_string()),
      SubjectAttribute::Role => Some(self.role.to_string()),
      SubjectAttribute::District => self.district.clone(),
      SubjectAttribute::DsDivision => self.ds_division.clone(),
      SubjectAttribute::GnDivision => self.gn_division.clone(),
    }
  }
}

// ─── Subject attributes ──────────────────────────────────────────────────────

/// The closed set of identity attributes a policy may constrain.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubjectAttribute {
  Id,
  Role,
  District,
  DsDivision,
  GnDivision,
}
