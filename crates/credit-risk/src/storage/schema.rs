pub const SCHEMA_VERSION: i32 = 1;

// `groups` is a keyword in recent SQLite releases, hence the `catalog_` prefix.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS admins (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    email          TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS applications (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    application_number  TEXT NOT NULL UNIQUE,
    name                TEXT NOT NULL,
    birth_date          TEXT NOT NULL,
    birth_place         TEXT NOT NULL,
    gender              TEXT NOT NULL CHECK (gender IN ('male', 'female')),
    address             TEXT NOT NULL,
    postal_code         TEXT NOT NULL CHECK (length(postal_code) = 5),
    owner_id            INTEGER NOT NULL REFERENCES admins(id) ON DELETE CASCADE,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_applications_owner ON applications(owner_id);

CREATE TABLE IF NOT EXISTS catalog_groups (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 3 AND 100),
    weight_b  REAL NOT NULL CHECK (weight_b BETWEEN 0 AND 1)
);

CREATE TABLE IF NOT EXISTS catalog_items (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id      INTEGER NOT NULL REFERENCES catalog_groups(id) ON DELETE CASCADE,
    display_name  TEXT NOT NULL CHECK (length(display_name) BETWEEN 3 AND 100),
    category      TEXT NOT NULL,
    option_label  TEXT NOT NULL,
    weight_d      REAL NOT NULL CHECK (weight_d BETWEEN 0 AND 1),
    weight_f      REAL NOT NULL CHECK (weight_f BETWEEN 0 AND 100)
);

CREATE INDEX IF NOT EXISTS idx_catalog_items_group ON catalog_items(group_id);

CREATE TABLE IF NOT EXISTS answers (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id  INTEGER NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    item_id         INTEGER NOT NULL REFERENCES catalog_items(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_answers_application ON answers(application_id);

CREATE TABLE IF NOT EXISTS scores (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id  INTEGER NOT NULL UNIQUE REFERENCES applications(id) ON DELETE CASCADE,
    total_score     REAL NOT NULL CHECK (total_score BETWEEN 0 AND 100),
    status          TEXT NOT NULL CHECK (status IN ('LOW RISK', 'MEDIUM RISK', 'HIGH RISK')),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
";
