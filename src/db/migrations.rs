use rusqlite::Connection;
use tracing::info;

use super::schema::{CREATE_TABLES, LEGACY_ARCHIVE_MARKER, SCHEMA_VERSION};
use crate::utils::error::AppResult;

/// Alle nötigen Migrationen ausführen
pub fn run_migrations(conn: &Connection) -> AppResult<()> {
    let current_version = get_current_version(conn)?;

    if current_version == 0 {
        info!("Lege neue Datenbank mit Schema-Version {} an", SCHEMA_VERSION);
        initial_setup(conn)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migriere Datenbank von Version {} auf {}",
            current_version, SCHEMA_VERSION
        );
        migrate_from(conn, current_version)?;
    } else {
        info!("Datenbank ist aktuell (Version {})", current_version);
    }

    Ok(())
}

pub(crate) fn get_current_version(conn: &Connection) -> AppResult<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_migrations')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

fn initial_setup(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(CREATE_TABLES)?;

    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [SCHEMA_VERSION],
    )?;

    info!("Initiales Setup abgeschlossen");
    Ok(())
}

fn migrate_from(conn: &Connection, from_version: i32) -> AppResult<()> {
    for version in (from_version + 1)..=SCHEMA_VERSION {
        let tx = conn.unchecked_transaction()?;

        match version {
            2 => migrate_v1_to_v2(&tx)?,
            3 => migrate_v2_to_v3(&tx)?,
            _ => {}
        }

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?)",
            [version],
        )?;
        tx.commit()?;

        info!("Auf Version {} migriert", version);
    }

    Ok(())
}

/// Migration v1 -> v2: Archivierung als Statusfeld
///
/// Version 1 markierte archivierte Baustellen mit einem Eintrag
/// `PROJECT_ARCHIVED`. Die Marker werden in `projects.status` überführt
/// und danach gelöscht.
fn migrate_v1_to_v2(conn: &Connection) -> AppResult<()> {
    info!("Migration v2: Archiv-Marker werden zum Statusfeld");

    conn.execute_batch(
        "ALTER TABLE projects ADD COLUMN status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'archived'));",
    )?;

    let archived = conn.execute(
        "UPDATE projects SET status = 'archived'
         WHERE id IN (SELECT project_id FROM notes WHERE content = ?1)",
        [LEGACY_ARCHIVE_MARKER],
    )?;
    let removed = conn.execute("DELETE FROM notes WHERE content = ?1", [LEGACY_ARCHIVE_MARKER])?;

    info!("{} Baustellen archiviert, {} Marker entfernt", archived, removed);
    Ok(())
}

/// Migration v2 -> v3: ausdrücklich angelegte Baustellen kennzeichnen
///
/// Bestehende Baustellen gelten als implizit und bleiben nur sichtbar,
/// solange noch Einträge oder Arbeitszeiten auf sie verweisen.
fn migrate_v2_to_v3(conn: &Connection) -> AppResult<()> {
    info!("Migration v3: Spalte projects.is_explicit");
    conn.execute_batch("ALTER TABLE projects ADD COLUMN is_explicit INTEGER NOT NULL DEFAULT 0;")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    const SCHEMA_V1: &str = r#"
        CREATE TABLE projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            client_name TEXT,
            address TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE materials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            unit TEXT NOT NULL DEFAULT '',
            price_per_unit REAL NOT NULL DEFAULT 0,
            stock_quantity REAL NOT NULL DEFAULT 0,
            min_stock REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Notiz',
            status TEXT NOT NULL DEFAULT 'In Arbeit',
            cost_amount REAL NOT NULL DEFAULT 0,
            image_url TEXT,
            audio_url TEXT,
            material_id INTEGER,
            user_id TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE staff (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            hourly_rate REAL NOT NULL DEFAULT 0
        );
        CREATE TABLE work_hours (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            worker_name TEXT NOT NULL,
            hours REAL NOT NULL,
            description TEXT,
            user_id TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        INSERT INTO schema_migrations (version) VALUES (1);
    "#;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_initial_migration() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables = table_names(&conn);
        for table in ["projects", "notes", "materials", "staff", "work_hours"] {
            assert!(tables.contains(&table.to_string()), "Tabelle {} fehlt", table);
        }
    }

    #[test]
    fn test_idempotent_migration() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_v1_archive_markers_become_status() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_V1).unwrap();
        conn.execute_batch(
            "INSERT INTO projects (name) VALUES ('Altbau'), ('Neubau');
             INSERT INTO notes (project_id, content) VALUES (1, 'Fenster bestellt');
             INSERT INTO notes (project_id, content) VALUES (1, 'PROJECT_ARCHIVED');
             INSERT INTO notes (project_id, content) VALUES (2, 'Keller betoniert');",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let status = |name: &str| -> String {
            conn.query_row("SELECT status FROM projects WHERE name = ?", [name], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(status("Altbau"), "archived");
        assert_eq!(status("Neubau"), "active");

        let markers: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM notes WHERE content = 'PROJECT_ARCHIVED'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(markers, 0);
        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);

        let explicit: i64 = conn
            .query_row("SELECT COUNT(*) FROM projects WHERE is_explicit = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(explicit, 0);
    }
}
