/// SQL migration for the contest log schema
///
/// - `AUTOINCREMENT` so ids are never handed out twice, even after deletes
/// - `date_time` is filled by the store at insert time
/// - Index on (callsign, band) backs the dupe check
pub const MIGRATION_001: &str = r#"
-- =============================================================================
-- Contacts - one row per logged QSO
-- =============================================================================
CREATE TABLE IF NOT EXISTS contacts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    callsign        TEXT NOT NULL,
    name            TEXT NOT NULL,
    qualifier       TEXT NOT NULL,          -- state/province or DX
    date_time       TEXT NOT NULL,          -- YYYY-MM-DD HH:MM:SS (UTC)
    frequency       TEXT NOT NULL,          -- Hz, as read from the radio
    band            TEXT NOT NULL,          -- e.g. "40", "0" when unknown
    grid            TEXT NOT NULL DEFAULT '',
    opname          TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_contacts_dupe ON contacts(callsign, band);
CREATE INDEX IF NOT EXISTS idx_contacts_time ON contacts(date_time);
"#;
