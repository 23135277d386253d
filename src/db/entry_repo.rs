use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::lock;
use super::project_repo::ProjectRepository;
use crate::models::{Entry, EntryCategory, EntryStatus, EntryUpdate, NewEntry, Project};
use crate::utils::error::{AppError, AppResult};

const SELECT_ENTRY: &str =
    "SELECT n.id, n.project_id, p.name, n.content, n.category, n.status, n.cost_amount,
            n.image_url, n.audio_url, n.material_id, n.user_id, n.is_completed,
            n.completed_at, n.created_at
     FROM notes n
     INNER JOIN projects p ON p.id = n.project_id";

/// Filter für Eintragslisten
#[derive(Debug, Default, Clone)]
pub struct EntryFilter {
    /// Nur Einträge dieser Baustelle
    pub project: Option<String>,
    /// Erledigt / offen (None = alle)
    pub completed: Option<bool>,
    pub category: Option<EntryCategory>,
}

impl EntryFilter {
    pub fn project(name: &str) -> Self {
        Self {
            project: Some(Project::normalize_name(name)),
            ..Default::default()
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn category(mut self, category: EntryCategory) -> Self {
        self.category = Some(category);
        self
    }
}

pub struct EntryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EntryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Eintrag anlegen; die Baustelle wird bei Bedarf mit angelegt
    pub fn create(&self, entry: &NewEntry, user_id: Option<&str>) -> AppResult<i64> {
        entry.validate()?;

        let conn = lock(&self.conn)?;
        let tx = conn.unchecked_transaction()?;
        let project = ProjectRepository::resolve_for_booking(&tx, &entry.project_name)?;
        let id = Self::insert_on(&tx, project.id.unwrap_or_default(), entry, user_id)?;
        tx.commit()?;

        Ok(id)
    }

    pub(crate) fn insert_on(
        conn: &Connection,
        project_id: i64,
        entry: &NewEntry,
        user_id: Option<&str>,
    ) -> AppResult<i64> {
        conn.execute(
            "INSERT INTO notes (project_id, content, category, status, cost_amount,
                                image_url, audio_url, material_id, user_id, is_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
            params![
                project_id,
                entry.content,
                entry.category.to_string(),
                entry.status.to_string(),
                entry.cost_amount,
                entry.image_url,
                entry.audio_url,
                entry.material_id,
                user_id,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> AppResult<Option<Entry>> {
        let conn = lock(&self.conn)?;
        let entry = conn
            .query_row(&format!("{} WHERE n.id = ?", SELECT_ENTRY), [id], Self::row_to_entry)
            .optional()?;
        Ok(entry)
    }

    /// Einträge nach Filter, neueste zuerst
    pub fn find(&self, filter: &EntryFilter) -> AppResult<Vec<Entry>> {
        let conn = lock(&self.conn)?;

        let mut sql = format!("{} WHERE 1=1", SELECT_ENTRY);
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project) = &filter.project {
            params_vec.push(Box::new(project.clone()));
            sql.push_str(&format!(" AND p.name = ?{}", params_vec.len()));
        }

        if let Some(completed) = filter.completed {
            params_vec.push(Box::new(completed));
            sql.push_str(&format!(" AND n.is_completed = ?{}", params_vec.len()));
        }

        if let Some(category) = filter.category {
            params_vec.push(Box::new(category.to_string()));
            sql.push_str(&format!(" AND n.category = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY n.created_at DESC, n.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(
                rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
                Self::row_to_entry,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("{} Einträge geladen ({:?})", entries.len(), filter);
        Ok(entries)
    }

    /// Als erledigt markieren. Gibt `true` zurück, wenn sich etwas geändert hat;
    /// bereits erledigte oder unbekannte Einträge bleiben unberührt.
    pub fn complete(&self, id: i64) -> AppResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE notes SET is_completed = 1, completed_at = datetime('now')
             WHERE id = ? AND is_completed = 0",
            [id],
        )?;
        Ok(rows > 0)
    }

    /// Teilweise Aktualisierung, der letzte Schreiber gewinnt
    pub fn update(&self, id: i64, update: &EntryUpdate) -> AppResult<()> {
        update.validate()?;

        let mut assignments: Vec<&str> = Vec::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(content) = &update.content {
            assignments.push("content");
            params_vec.push(Box::new(content.clone()));
        }
        if let Some(category) = update.category {
            assignments.push("category");
            params_vec.push(Box::new(category.to_string()));
        }
        if let Some(status) = update.status {
            assignments.push("status");
            params_vec.push(Box::new(status.to_string()));
        }
        if let Some(cost) = update.cost_amount {
            assignments.push("cost_amount");
            params_vec.push(Box::new(cost));
        }
        // Some(None) entfernt den Verweis
        if let Some(url) = &update.image_url {
            assignments.push("image_url");
            params_vec.push(Box::new(url.clone()));
        }
        if let Some(url) = &update.audio_url {
            assignments.push("audio_url");
            params_vec.push(Box::new(url.clone()));
        }

        let conn = lock(&self.conn)?;

        if assignments.is_empty() {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?)",
                [id],
                |row| row.get(0),
            )?;
            return if exists {
                Ok(())
            } else {
                Err(AppError::not_found(format!("Eintrag {}", id)))
            };
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        params_vec.push(Box::new(id));
        let sql = format!("UPDATE notes SET {} WHERE id = ?{}", set_clause, params_vec.len());

        let rows = conn.execute(
            &sql,
            rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("Eintrag {}", id)));
        }
        Ok(())
    }

    /// Endgültig löschen. Gibt `true` zurück, wenn ein Eintrag entfernt wurde.
    pub fn delete(&self, id: i64) -> AppResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    /// Alle Kostenbeträge einer Baustelle
    pub fn cost_amounts(&self, project: &str) -> AppResult<Vec<(EntryCategory, f64)>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT n.category, n.cost_amount
             FROM notes n
             INNER JOIN projects p ON p.id = n.project_id
             WHERE p.name = ?",
        )?;

        let rows = stmt
            .query_map([Project::normalize_name(project)], |row| {
                let category: String = row.get(0)?;
                let cost: Option<f64> = row.get(1)?;
                Ok((
                    EntryCategory::from_db_str(&category).unwrap_or_default(),
                    cost.unwrap_or(0.0),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Alle Medien-URLs, auf die noch ein Eintrag verweist
    pub fn referenced_media_urls(&self) -> AppResult<HashSet<String>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT image_url FROM notes WHERE image_url IS NOT NULL
             UNION
             SELECT audio_url FROM notes WHERE audio_url IS NOT NULL",
        )?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;

        Ok(urls)
    }

    pub fn count(&self) -> AppResult<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<Entry> {
        let category: String = row.get(4)?;
        let status: String = row.get(5)?;
        let cost: Option<f64> = row.get(6)?;

        Ok(Entry {
            id: row.get(0)?,
            project_id: row.get(1)?,
            project_name: row.get(2)?,
            content: row.get(3)?,
            category: EntryCategory::from_db_str(&category).unwrap_or_default(),
            status: EntryStatus::from_db_str(&status).unwrap_or_default(),
            cost_amount: cost.unwrap_or(0.0),
            image_url: row.get(7)?,
            audio_url: row.get(8)?,
            material_id: row.get(9)?,
            user_id: row.get(10)?,
            is_completed: row.get(11)?,
            completed_at: row.get(12)?,
            created_at: row.get(13)?,
        })
    }
}
