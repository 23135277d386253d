pub mod schema;
pub mod migrations;
pub mod project_repo;
pub mod entry_repo;
pub mod material_repo;
pub mod staff_repo;

use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::utils::error::{AppError, AppResult};

pub use project_repo::ProjectRepository;
pub use entry_repo::{EntryFilter, EntryRepository};
pub use material_repo::MaterialRepository;
pub use staff_repo::StaffRepository;

/// Datenbank-Wrapper mit thread-sicherem Zugriff
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Datenbank öffnen oder anlegen
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-Memory-Datenbank (für Tests)
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Migrationen ausführen
    pub fn migrate(&self) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        migrations::run_migrations(&conn)
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(Arc::clone(&self.conn))
    }

    pub fn entries(&self) -> EntryRepository {
        EntryRepository::new(Arc::clone(&self.conn))
    }

    pub fn materials(&self) -> MaterialRepository {
        MaterialRepository::new(Arc::clone(&self.conn))
    }

    pub fn staff(&self) -> StaffRepository {
        StaffRepository::new(Arc::clone(&self.conn))
    }

    /// Direkter Zugriff auf die Verbindung
    pub fn with_connection<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = lock(&self.conn)?;
        f(&conn)
    }

    /// Mehrere Schreibvorgänge atomar ausführen; bei `Err` wird alles zurückgerollt
    pub fn with_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

pub(crate) fn lock(conn: &Mutex<Connection>) -> AppResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| AppError::other("Datenbankverbindung ist blockiert (Mutex vergiftet)"))
}
