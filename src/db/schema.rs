/// SQL-Schema für WerkOS

pub const SCHEMA_VERSION: i32 = 3;

pub const CREATE_TABLES: &str = r#"
-- Baustellen
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    client_name TEXT,
    address TEXT,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'archived')),
    is_explicit INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Materialkatalog
CREATE TABLE IF NOT EXISTS materials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    unit TEXT NOT NULL DEFAULT '',
    price_per_unit REAL NOT NULL DEFAULT 0 CHECK (price_per_unit >= 0),
    stock_quantity REAL NOT NULL DEFAULT 0,
    min_stock REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Einträge (Notizen, Aufgaben, Materialverbrauch, Wichtiges)
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    content TEXT NOT NULL CHECK (length(trim(content)) > 0),
    category TEXT NOT NULL DEFAULT 'Notiz',
    status TEXT NOT NULL DEFAULT 'In Arbeit',
    cost_amount REAL NOT NULL DEFAULT 0 CHECK (cost_amount >= 0),
    image_url TEXT,
    audio_url TEXT,
    material_id INTEGER,
    user_id TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE RESTRICT,
    FOREIGN KEY (material_id) REFERENCES materials(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_project ON notes(project_id, is_completed);
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at);

-- Personal
CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    hourly_rate REAL NOT NULL DEFAULT 0 CHECK (hourly_rate >= 0)
);

-- Arbeitszeiten
CREATE TABLE IF NOT EXISTS work_hours (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    worker_name TEXT NOT NULL,
    hours REAL NOT NULL CHECK (hours > 0),
    description TEXT,
    user_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_work_hours_project ON work_hours(project_id);

-- Migrationshistorie
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Marker, mit dem alte Datenbestände archivierte Baustellen kennzeichneten
pub const LEGACY_ARCHIVE_MARKER: &str = "PROJECT_ARCHIVED";
