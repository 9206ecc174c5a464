//! Database schema definitions

pub const CREATE_SITES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    domain TEXT NOT NULL,
    created_at BIGINT NOT NULL
)
"#;

pub const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id TEXT NOT NULL,
    session_hash TEXT NOT NULL,
    path TEXT NOT NULL,
    timestamp BIGINT NOT NULL
)
"#;

// === COVERING INDEXES (one per reporting query) ===

// For stats: distinct session hashes and total views per site
pub const CREATE_INDEX_SITE_SESSION: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_site_session ON events(site_id, session_hash)";

// For the daily time series (date is derived from timestamp)
pub const CREATE_INDEX_SITE_TIMESTAMP: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_site_timestamp ON events(site_id, timestamp)";

// For top-pages aggregation
pub const CREATE_INDEX_SITE_PATH: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_site_path ON events(site_id, path)";
