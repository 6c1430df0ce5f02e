//! SQL schema for the relief SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS policies (
    name         TEXT PRIMARY KEY,
    resource     TEXT NOT NULL,
    action       TEXT NOT NULL,             -- exact action or '*'
    subject_json TEXT NOT NULL DEFAULT '{}',
    effect       TEXT NOT NULL CHECK (effect IN ('allow', 'deny')),
    priority     INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- Rows are never deleted; deleted_at marks a soft delete.
CREATE TABLE IF NOT EXISTS relief_requests (
    request_id            TEXT PRIMARY KEY,
    gn_id                 TEXT,
    gn_division           TEXT NOT NULL,
    ds_division           TEXT NOT NULL,
    district              TEXT NOT NULL,
    household_id          TEXT NOT NULL,
    census_block          TEXT,
    census_unit           TEXT,
    incident_type         TEXT NOT NULL,
    start_date            TEXT NOT NULL,   -- YYYY-MM-DD
    end_date              TEXT,
    ownership_status      TEXT,
    is_estate             INTEGER NOT NULL DEFAULT 0,
    damage_zone           TEXT,
    damage_severity       TEXT,
    relief_amount         INTEGER NOT NULL DEFAULT 0,
    bank_name             TEXT NOT NULL,
    branch_name           TEXT,
    account_holder        TEXT NOT NULL,
    account_number        TEXT NOT NULL,
    account_nic           TEXT NOT NULL,
    status                TEXT NOT NULL DEFAULT 'pending'
                          CHECK (status IN ('pending', 'approved', 'rejected')),
    remarks               TEXT,
    is_duplicate          INTEGER NOT NULL DEFAULT 0,
    duplicate_reason      TEXT,
    original_request_id   TEXT REFERENCES relief_requests(request_id),
    data_entered_by       TEXT NOT NULL,
    action_by             TEXT,
    assigned_volunteer_id TEXT,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL,
    deleted_at            TEXT,
    deleted_by            TEXT,
    CHECK (is_duplicate = 0
           OR (duplicate_reason IS NOT NULL AND original_request_id IS NOT NULL))
);

-- Evidence attachments are immutable once written.
CREATE TABLE IF NOT EXISTS relief_request_media (
    media_id      TEXT PRIMARY KEY,
    request_id    TEXT NOT NULL REFERENCES relief_requests(request_id),
    file_url      TEXT NOT NULL,
    file_type     TEXT NOT NULL,
    original_name TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS relief_requests_final_status
BEFORE UPDATE OF status ON relief_requests
WHEN OLD.status != 'pending' AND NEW.status != OLD.status
BEGIN
    SELECT RAISE(ABORT, 'relief request status is final');
END;

CREATE TRIGGER IF NOT EXISTS relief_requests_no_delete
BEFORE DELETE ON relief_requests
BEGIN
    SELECT RAISE(ABORT, 'relief requests are only soft-deleted');
END;

CREATE TRIGGER IF NOT EXISTS relief_request_media_immutable
BEFORE UPDATE ON relief_request_media
BEGIN
    SELECT RAISE(ABORT, 'relief request media is immutable');
END;

CREATE TRIGGER IF NOT EXISTS relief_request_media_no_delete
BEFORE DELETE ON relief_request_media
BEGIN
    SELECT RAISE(ABORT, 'relief request media is immutable');
END;

CREATE INDEX IF NOT EXISTS policies_lookup_idx     ON policies(resource, action);
CREATE INDEX IF NOT EXISTS requests_nic_idx        ON relief_requests(account_nic, status);
CREATE INDEX IF NOT EXISTS requests_household_idx  ON relief_requests(household_id, incident_type);
CREATE INDEX IF NOT EXISTS requests_district_idx   ON relief_requests(district, status);
CREATE INDEX IF NOT EXISTS requests_division_idx   ON relief_requests(ds_division);
CREATE INDEX IF NOT EXISTS requests_entered_by_idx ON relief_requests(data_entered_by);
CREATE INDEX IF NOT EXISTS media_request_idx       ON relief_request_media(request_id);

PRAGMA user_version = 1;
";
