//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the verified user as
//! headers. A request without `x-user-id` carries no identity. One that has
//! it but a malformed id or role is rejected outright.

use std::str::FromStr;

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::{HeaderMap, request::Parts},
};
use relief_core::{Error, Identity, Role};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID: &str = "x-user-id";
pub const USER_ROLE: &str = "x-user-role";
pub const USER_DISTRICT: &str = "x-user-district";
pub const USER_DS_DIVISION: &str = "x-user-ds-division";
pub const USER_GN_DIVISION: &str = "x-user-gn-division";

/// The verified caller. Rejects with 401 when absent.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

/// Parse the identity headers. `Ok(None)` when no `x-user-id` is present.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Option<Identity>, Error> {
  let Some(id) = header(headers, USER_ID) else {
    return Ok(None);
  };
  let id = Uuid::parse_str(id).map_err(|_| Error::Unauthenticated)?;
  let role = header(headers, USER_ROLE)
    .and_then(|r| Role::from_str(r).ok())
    .ok_or(Error::Unauthenticated)?;

  Ok(Some(Identity {
    id,
    role,
    district: header(headers, USER_DISTRICT).map(str::to_owned),
    ds_division: header(headers, USER_DS_DIVISION).map(str::to_owned),
    gn_division: header(headers, USER_GN_DIVISION).map(str::to_owned),
  }))
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
    identity_from_headers(&parts.headers)?
      .map(Caller)
      .ok_or(ApiError::Relief(Error::Unauthenticated))
  }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    Ok(identity_from_headers(&parts.headers)?.map(Caller))
  }
}
