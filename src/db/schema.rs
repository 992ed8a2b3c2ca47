//! SQL DDL for the local document store.
//! Every table of the app is a `tbl` partition of one `records` table holding JSON objects.

/// SQLite schema with:
/// - (`tbl`, `id`) as the primary key
/// - `data` holding the whole record as a JSON object (queried via `json_extract`)
/// - `created_at` mirrored out of `data` for the per-table time index
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    tbl TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL, -- JSON object
    created_at TEXT NOT NULL, -- fixed-width UTC
    PRIMARY KEY (tbl, id)
);

CREATE INDEX IF NOT EXISTS idx_records_tbl_created ON records(tbl, created_at);
"#;
