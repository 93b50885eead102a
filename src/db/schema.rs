pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS properties (
    id TEXT PRIMARY KEY,
    address TEXT NOT NULL,
    city TEXT NOT NULL DEFAULT '',
    price REAL CHECK (price IS NULL OR price >= 0),
    posting_date TEXT,
    property_type TEXT NOT NULL DEFAULT 'house',
    bedrooms REAL,
    bathrooms REAL,
    square_feet INTEGER,
    is_still_listed INTEGER NOT NULL DEFAULT 1,
    owner_name TEXT NOT NULL DEFAULT '',
    owner_phone TEXT,
    owner_email TEXT,
    lead_status TEXT NOT NULL DEFAULT 'new',
    last_contact_date TEXT,
    notes TEXT,
    listing_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_logs (
    id TEXT PRIMARY KEY,
    property_id TEXT NOT NULL,
    contact_date TEXT NOT NULL,
    contact_method TEXT NOT NULL,
    outcome TEXT NOT NULL,
    notes TEXT,
    follow_up_date TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_property_status ON properties(lead_status);
CREATE INDEX IF NOT EXISTS idx_property_posting ON properties(posting_date);
CREATE INDEX IF NOT EXISTS idx_property_created ON properties(created_at);
CREATE INDEX IF NOT EXISTS idx_contact_log_property ON contact_logs(property_id);
CREATE INDEX IF NOT EXISTS idx_contact_log_date ON contact_logs(contact_date);
"#;
