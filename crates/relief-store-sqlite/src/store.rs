//! [`SqliteStore`], the SQLite implementation of [`ReliefStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, named_params};
use tracing::debug;
use uuid::Uuid;

use relief_core::{
  policy::{NewPolicy, Policy, PolicyUpdate},
  request::{
    DistrictStats, NewReliefRequest, ReliefRequest, ReliefRequestMedia, RequestStatus,
    StatusChange, StatusUpdate,
  },
  scope::Scope,
  store::{ReliefStore, RequestQuery},
};

use crate::{
  Error, Result,
  encode::{
    MEDIA_COLUMNS, POLICY_COLUMNS, REQUEST_COLUMNS, RawMedia, RawPolicy, RawRequest,
    decode_status, encode_amount, encode_date, encode_dt, encode_subject, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row loading ─────────────────────────────────────────────────────────────

type RawRow = (RawRequest, Vec<RawMedia>);

/// Live (not soft-deleted) requests matching `filter`, each with its media.
fn load_requests(
  conn: &Connection,
  filter: &str,
  order: &str,
  params: &[String],
) -> rusqlite::Result<Vec<RawRow>> {
  let sql = format!(
    "SELECT {REQUEST_COLUMNS} FROM relief_requests
     WHERE deleted_at IS NULL AND ({filter})
     ORDER BY {order}"
  );
  let requests = conn
    .prepare(&sql)?
    .query_map(rusqlite::params_from_iter(params), RawRequest::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut media_stmt = conn.prepare(&format!(
    "SELECT {MEDIA_COLUMNS} FROM relief_request_media
     WHERE request_id = ?1
     ORDER BY created_at, rowid"
  ))?;

  requests
    .into_iter()
    .map(|raw| {
      let media = media_stmt
        .query_map([&raw.request_id], RawMedia::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok((raw, media))
    })
    .collect()
}

fn load_request(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawRow>> {
  Ok(
    load_requests(conn, "request_id = ?1", "rowid", &[id.to_owned()])?
      .into_iter()
      .next(),
  )
}

fn decode_rows(rows: Vec<RawRow>) -> Result<Vec<ReliefRequest>> {
  rows
    .into_iter()
    .map(|(raw, media)| raw.into_request(media))
    .collect()
}

fn decode_row(row: Option<RawRow>) -> Result<Option<ReliefRequest>> {
  row.map(|(raw, media)| raw.into_request(media)).transpose()
}

/// SQL condition and parameters selecting the requests a scope reaches.
fn scope_filter(scope: &Scope) -> (&'static str, Vec<String>) {
  match scope {
    Scope::Unrestricted => ("1", vec![]),
    Scope::District(district) => ("district = ?", vec![district.clone()]),
    Scope::Division(division) => ("ds_division = ?", vec![division.clone()]),
    Scope::Volunteer(id) => (
      "(data_entered_by = ? OR assigned_volunteer_id = ?)",
      vec![encode_uuid(*id), encode_uuid(*id)],
    ),
    Scope::EnteredBy(id) => ("data_entered_by = ?", vec![encode_uuid(*id)]),
    Scope::Nothing => ("0", vec![]),
  }
}

const OLDEST_FIRST: &str = "created_at ASC, rowid ASC";
const NEWEST_FIRST: &str = "created_at DESC, rowid DESC";
const ACTIVE_BY_NIC: &str = "account_nic = ?1 AND status IN ('pending', 'approved')";
const ACTIVE_BY_HOUSEHOLD: &str =
  "household_id = ?1 AND incident_type = ?2 AND status IN ('pending', 'approved')";

enum RawPolicyUpdate {
  Updated(RawPolicy),
  NameTaken,
  NotFound,
}

enum RawStatusUpdate {
  Updated(RawRow),
  AlreadyFinal(String),
  NotFound,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A relief store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    debug!(path = %path.as_ref().display(), "opening relief store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn find_one(
    &self,
    filter: &'static str,
    params: Vec<String>,
  ) -> Result<Option<ReliefRequest>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(load_requests(conn, filter, OLDEST_FIRST, &params)?.into_iter().next())
      })
      .await?;
    decode_row(row)
  }
}

// ─── ReliefStore impl ────────────────────────────────────────────────────────

impl ReliefStore for SqliteStore {
  type Error = Error;

  // ── Policies ──────────────────────────────────────────────────────────────

  async fn list_policies(&self) -> Result<Vec<Policy>> {
    let raws: Vec<RawPolicy> = self
      .conn
      .call(|conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies ORDER BY resource, action, name"
          ))?
          .query_map([], RawPolicy::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPolicy::into_policy).collect()
  }

  async fn get_policy(&self, name: String) -> Result<Option<Policy>> {
    let raw: Option<RawPolicy> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POLICY_COLUMNS} FROM policies WHERE name = ?1"),
              [&name],
              RawPolicy::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPolicy::into_policy).transpose()
  }

  async fn policies_for(&self, resource: String, action: String) -> Result<Vec<Policy>> {
    let raws: Vec<RawPolicy> = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies
             WHERE resource = ?1 AND (action = ?2 OR action = '*')
             ORDER BY priority DESC, name"
          ))?
          .query_map([&resource, &action], RawPolicy::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPolicy::into_policy).collect()
  }

  async fn create_policy(&self, input: NewPolicy) -> Result<Option<Policy>> {
    let now = Utc::now();
    let subject_json = encode_subject(&input.subject)?;
    let effect = input.effect.as_ref().to_owned();
    let at = encode_dt(now);
    let name = input.name.clone();
    let resource = input.resource.clone();
    let action = input.action.clone();
    let priority = input.priority;

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO policies (
             name, resource, action, subject_json, effect, priority, created_at, updated_at
           ) VALUES (:name, :resource, :action, :subject, :effect, :priority, :at, :at)
           ON CONFLICT(name) DO NOTHING",
          named_params! {
            ":name":     name,
            ":resource": resource,
            ":action":   action,
            ":subject":  subject_json,
            ":effect":   effect,
            ":priority": priority,
            ":at":       at,
          },
        )?;
        Ok(changed == 1)
      })
      .await?;

    if !inserted {
      debug!(policy = %input.name, "policy name already taken");
      return Ok(None);
    }

    Ok(Some(Policy {
      name:       input.name,
      resource:   input.resource,
      action:     input.action,
      subject:    input.subject,
      effect:     input.effect,
      priority:   input.priority,
      created_at: now,
      updated_at: now,
    }))
  }

  async fn update_policy(&self, name: String, input: NewPolicy) -> Result<PolicyUpdate> {
    let subject_json = encode_subject(&input.subject)?;
    let effect = input.effect.as_ref().to_owned();
    let at = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if input.name != name {
          let taken = tx
            .query_row("SELECT 1 FROM policies WHERE name = ?1", [&input.name], |_| Ok(()))
            .optional()?
            .is_some();
          if taken {
            return Ok(RawPolicyUpdate::NameTaken);
          }
        }
        let changed = tx.execute(
          "UPDATE policies
           SET name = :new_name, resource = :resource, action = :action,
               subject_json = :subject, effect = :effect, priority = :priority,
               updated_at = :at
           WHERE name = :name",
          named_params! {
            ":new_name": input.name,
            ":resource": input.resource,
            ":action":   input.action,
            ":subject":  subject_json,
            ":effect":   effect,
            ":priority": input.priority,
            ":at":       at,
            ":name":     name,
          },
        )?;
        if changed == 0 {
          return Ok(RawPolicyUpdate::NotFound);
        }
        let raw = tx.query_row(
          &format!("SELECT {POLICY_COLUMNS} FROM policies WHERE name = ?1"),
          [&input.name],
          RawPolicy::from_row,
        )?;
        tx.commit()?;
        Ok(RawPolicyUpdate::Updated(raw))
      })
      .await?;

    Ok(match outcome {
      RawPolicyUpdate::Updated(raw) => PolicyUpdate::Updated(raw.into_policy()?),
      RawPolicyUpdate::NameTaken => {
        debug!("policy rename target already taken");
        PolicyUpdate::NameTaken
      }
      RawPolicyUpdate::NotFound => PolicyUpdate::NotFound,
    })
  }

  async fn delete_policy(&self, name: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM policies WHERE name = ?1", [&name])?))
      .await?;
    Ok(changed > 0)
  }

  // ── Relief requests ───────────────────────────────────────────────────────

  async fn insert_request(&self, input: NewReliefRequest) -> Result<ReliefRequest> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let d = &input.details;

    let media: Vec<ReliefRequestMedia> = input
      .media
      .iter()
      .map(|m| ReliefRequestMedia {
        media_id:      Uuid::new_v4(),
        request_id:    id,
        file_url:      m.file_url.clone(),
        file_type:     m.file_type.clone(),
        original_name: m.original_name.clone(),
        created_at:    now,
      })
      .collect();

    let request = ReliefRequest {
      id,
      details: d.clone(),
      status: RequestStatus::Pending,
      remarks: None,
      is_duplicate: input.duplicate.is_some(),
      duplicate_reason: input.duplicate.as_ref().map(|m| m.reason.to_string()),
      original_request_id: input.duplicate.as_ref().map(|m| m.original_request_id),
      data_entered_by: input.data_entered_by,
      action_by: None,
      assigned_volunteer_id: None,
      created_at: now,
      updated_at: now,
      media,
    };

    let id_str       = encode_uuid(id);
    let at           = encode_dt(now);
    let start_date   = encode_date(d.start_date);
    let end_date     = d.end_date.map(encode_date);
    let amount       = encode_amount(d.relief_amount)?;
    let original     = request.original_request_id.map(encode_uuid);
    let entered_by   = encode_uuid(request.data_entered_by);
    let media_rows: Vec<[String; 4]> = request
      .media
      .iter()
      .map(|m| {
        [
          encode_uuid(m.media_id),
          m.file_url.clone(),
          m.file_type.clone(),
          m.original_name.clone(),
        ]
      })
      .collect();
    let row = request.clone();

    self
      .conn
      .call(move |conn| {
        let d = &row.details;
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO relief_requests (
             request_id, gn_id, gn_division, ds_division, district, household_id,
             census_block, census_unit, incident_type, start_date, end_date,
             ownership_status, is_estate, damage_zone, damage_severity, relief_amount,
             bank_name, branch_name, account_holder, account_number, account_nic,
             status, is_duplicate, duplicate_reason, original_request_id,
             data_entered_by, created_at, updated_at
           ) VALUES (
             :id, :gn_id, :gn_division, :ds_division, :district, :household_id,
             :census_block, :census_unit, :incident_type, :start_date, :end_date,
             :ownership_status, :is_estate, :damage_zone, :damage_severity, :amount,
             :bank_name, :branch_name, :account_holder, :account_number, :account_nic,
             'pending', :is_duplicate, :duplicate_reason, :original,
             :entered_by, :at, :at
           )",
          named_params! {
            ":id":               id_str,
            ":gn_id":            d.gn_id,
            ":gn_division":      d.gn_division,
            ":ds_division":      d.ds_division,
            ":district":         d.district,
            ":household_id":     d.household_id,
            ":census_block":     d.census_block,
            ":census_unit":      d.census_unit,
            ":incident_type":    d.incident_type,
            ":start_date":       start_date,
            ":end_date":         end_date,
            ":ownership_status": d.ownership_status,
            ":is_estate":        d.is_estate,
            ":damage_zone":      d.damage_zone,
            ":damage_severity":  d.damage_severity,
            ":amount":           amount,
            ":bank_name":        d.bank_name,
            ":branch_name":      d.branch_name,
            ":account_holder":   d.account_holder,
            ":account_number":   d.account_number,
            ":account_nic":      d.account_nic,
            ":is_duplicate":     row.is_duplicate,
            ":duplicate_reason": row.duplicate_reason,
            ":original":         original,
            ":entered_by":       entered_by,
            ":at":               at,
          },
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO relief_request_media (
               media_id, request_id, file_url, file_type, original_name, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for [media_id, file_url, file_type, original_name] in &media_rows {
            stmt.execute(rusqlite::params![
              media_id,
              id_str,
              file_url,
              file_type,
              original_name,
              at,
            ])?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(request_id = %id, media = request.media.len(), "relief request stored");
    Ok(request)
  }

  async fn get_request(&self, id: Uuid) -> Result<Option<ReliefRequest>> {
    let id_str = encode_uuid(id);
    let row = self
      .conn
      .call(move |conn| Ok(load_request(conn, &id_str)?))
      .await?;
    decode_row(row)
  }

  async fn list_requests(&self, query: RequestQuery) -> Result<Vec<ReliefRequest>> {
    let (scope_sql, mut params) = scope_filter(&query.scope);
    let mut filter = scope_sql.to_owned();
    if let Some(status) = query.status {
      filter.push_str(" AND status = ?");
      params.push(status.as_ref().to_owned());
    }

    let rows = self
      .conn
      .call(move |conn| Ok(load_requests(conn, &filter, NEWEST_FIRST, &params)?))
      .await?;
    decode_rows(rows)
  }

  async fn find_active_by_nic(&self, account_nic: String) -> Result<Option<ReliefRequest>> {
    self.find_one(ACTIVE_BY_NIC, vec![account_nic]).await
  }

  async fn find_active_by_household(
    &self,
    household_id: String,
    incident_type: String,
  ) -> Result<Option<ReliefRequest>> {
    self.find_one(ACTIVE_BY_HOUSEHOLD, vec![household_id, incident_type]).await
  }

  async fn set_status(&self, id: Uuid, change: StatusChange) -> Result<StatusUpdate> {
    let id_str = encode_uuid(id);
    let status = change.status.as_ref().to_owned();
    let action_by = encode_uuid(change.action_by);
    let at = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM relief_requests
             WHERE request_id = ?1 AND deleted_at IS NULL",
            [&id_str],
            |row| row.get(0),
          )
          .optional()?;

        let outcome = match current {
          None => RawStatusUpdate::NotFound,
          Some(current) if current != "pending" => RawStatusUpdate::AlreadyFinal(current),
          Some(_) => {
            tx.execute(
              "UPDATE relief_requests
               SET status = :status, remarks = :remarks, action_by = :action_by,
                   updated_at = :at
               WHERE request_id = :id AND status = 'pending'",
              named_params! {
                ":status":    status,
                ":remarks":   change.remarks,
                ":action_by": action_by,
                ":at":        at,
                ":id":        id_str,
              },
            )?;
            match load_request(&tx, &id_str)? {
              Some(row) => RawStatusUpdate::Updated(row),
              None => RawStatusUpdate::NotFound,
            }
          }
        };
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(match outcome {
      RawStatusUpdate::Updated((raw, media)) => StatusUpdate::Updated(raw.into_request(media)?),
      RawStatusUpdate::AlreadyFinal(status) => StatusUpdate::AlreadyFinal(decode_status(&status)?),
      RawStatusUpdate::NotFound => StatusUpdate::NotFound,
    })
  }

  async fn assign_volunteer(&self, id: Uuid, volunteer_id: Uuid) -> Result<Option<ReliefRequest>> {
    let id_str = encode_uuid(id);
    let volunteer = encode_uuid(volunteer_id);
    let at = encode_dt(Utc::now());

    let row = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE relief_requests
           SET assigned_volunteer_id = ?1, updated_at = ?2
           WHERE request_id = ?3 AND deleted_at IS NULL",
          [&volunteer, &at, &id_str],
        )?;
        let row = if changed == 0 { None } else { load_request(&tx, &id_str)? };
        tx.commit()?;
        Ok(row)
      })
      .await?;

    decode_row(row)
  }

  async fn soft_delete_request(&self, id: Uuid, deleted_by: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let by = encode_uuid(deleted_by);
    let at = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE relief_requests
           SET deleted_at = ?1, deleted_by = ?2, updated_at = ?1
           WHERE request_id = ?3 AND deleted_at IS NULL",
          [&at, &by, &id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn district_stats(&self) -> Result<BTreeMap<String, DistrictStats>> {
    let rows: Vec<(String, String, i64)> = self
      .conn
      .call(|conn| {
        let rows = conn
          .prepare(
            "SELECT district, status, COUNT(*) FROM relief_requests
             WHERE deleted_at IS NULL
             GROUP BY district, status",
          )?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut stats: BTreeMap<String, DistrictStats> = BTreeMap::new();
    for (district, status, count) in rows {
      let count =
        u64::try_from(count).map_err(|_| Error::OutOfRange(format!("count {count}")))?;
      stats.entry(district).or_default().add(decode_status(&status)?, count);
    }
    Ok(stats)
  }
}

