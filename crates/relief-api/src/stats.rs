//! `GET /stats/districts`: request counts per district and status.

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, extract::State};
use relief_core::{ReliefService, request::DistrictStats, store::ReliefStore};

use crate::{error::ApiError, identity::Caller};

pub async fn districts<S: ReliefStore>(
  State(service): State<Arc<ReliefService<S>>>,
  Caller(identity): Caller,
) -> Result<Json<BTreeMap<String, DistrictStats>>, ApiError> {
  Ok(Json(service.district_stats(&identity).await?))
}
