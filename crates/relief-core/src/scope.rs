//! Geographic scope guard.
//!
//! Roles form a geographic hierarchy. A caller's [`Scope`] is the set of
//! relief requests they may see or act on, derived from their role and
//! attributes. Stores translate it into a query filter; the workflow also
//! applies it record-by-record before any mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  identity::{Identity, Role},
  request::ReliefRequest,
};

/// Which relief requests a caller may reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Scope {
  /// Every request.
  Unrestricted,
  /// Requests whose `district` equals the value.
  District(String),
  /// Requests whose `ds_division` equals the value.
  Division(String),
  /// Requests entered by, or assigned to, this volunteer.
  Volunteer(Uuid),
  /// Requests entered by this officer.
  EnteredBy(Uuid),
  /// No request at all; an officer missing the attribute their tier needs.
  Nothing,
}

impl Scope {
  pub fn for_identity(identity: &Identity) -> Self {
    match identity.role {
      Role::SuperUser | Role::NationalOfficer => Self::Unrestricted,
      Role::DistrictOfficer => identity
        .district
        .clone()
        .map_or(Self::Nothing, Self::District),
      Role::DivisionOfficer => identity
        .ds_division
        .clone()
        .map_or(Self::Nothing, Self::Division),
      Role::UnVolunteer => Self::Volunteer(identity.id),
      Role::GnOfficer => Self::EnteredBy(identity.id),
    }
  }

  pub fn permits(&self, request: &ReliefRequest) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::District(district) => request.details.district == *district,
      Self::Division(division) => request.details.ds_division == *division,
      Self::Volunteer(id) => {
        request.data_entered_by == *id
          || request.assigned_volunteer_id == Some(*id)
      }
      Self::EnteredBy(id) => request.data_entered_by == *id,
      Self::Nothing => false,
    }
  }
}
