use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::models::{Project, ProjectStatus};
use crate::utils::error::{AppError, AppResult};

const SELECT_PROJECT: &str =
    "SELECT id, name, client_name, address, status, is_explicit, created_at FROM projects";

pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Alle Baustellen, alphabetisch
    pub fn find_all(&self) -> AppResult<Vec<Project>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY name", SELECT_PROJECT))?;

        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// Namen aller Baustellen mit gegebenem Status, alphabetisch. Implizit
    /// angelegte aktive Baustellen erscheinen nur, solange Zeilen auf sie verweisen.
    pub fn names_with_status(&self, status: ProjectStatus) -> AppResult<Vec<String>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT p.name FROM projects p
             WHERE p.status = ?1
               AND (p.status = 'archived'
                    OR p.is_explicit = 1
                    OR EXISTS (SELECT 1 FROM notes n WHERE n.project_id = p.id)
                    OR EXISTS (SELECT 1 FROM work_hours w WHERE w.project_id = p.id))
             ORDER BY p.name",
        )?;

        let names = stmt
            .query_map([status.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    pub fn find_by_id(&self, id: i64) -> AppResult<Option<Project>> {
        let conn = lock(&self.conn)?;
        let project = conn
            .query_row(&format!("{} WHERE id = ?", SELECT_PROJECT), [id], Self::row_to_project)
            .optional()?;
        Ok(project)
    }

    pub fn find_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        let conn = lock(&self.conn)?;
        Self::find_by_name_on(&conn, name)
    }

    /// Neue Baustelle anlegen
    pub fn create(&self, project: &mut Project) -> AppResult<i64> {
        project.name = Project::normalize_name(&project.name);
        project.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO projects (name, client_name, address, status, is_explicit)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![
                project.name,
                project.client_name,
                project.address,
                project.status.to_string(),
            ],
        )
        .map_err(|e| AppError::from_unique_violation(e, format!("Baustelle '{}'", project.name)))?;

        let id = conn.last_insert_rowid();
        project.id = Some(id);
        project.is_explicit = true;
        Ok(id)
    }

    /// Status setzen (Archivieren / Reaktivieren)
    pub fn set_status(&self, name: &str, status: ProjectStatus) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE projects SET status = ?1 WHERE name = ?2",
            params![status.to_string(), Project::normalize_name(name)],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("Baustelle '{}'", name)));
        }
        Ok(())
    }

    /// Baustelle löschen; solange Einträge oder Arbeitszeiten auf sie
    /// verweisen, wird das abgelehnt.
    pub fn delete(&self, name: &str) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let tx = conn.unchecked_transaction()?;

        let project = Self::find_by_name_on(&tx, name)?
            .ok_or_else(|| AppError::not_found(format!("Baustelle '{}'", name.trim())))?;
        let references: i64 = tx.query_row(
            "SELECT (SELECT COUNT(*) FROM notes WHERE project_id = ?1)
                  + (SELECT COUNT(*) FROM work_hours WHERE project_id = ?1)",
            [project.id],
            |row| row.get(0),
        )?;
        if references > 0 {
            return Err(AppError::validation(format!(
                "Baustelle '{}' hat noch {} Einträge oder Arbeitszeiten",
                project.name, references
            )));
        }

        tx.execute("DELETE FROM projects WHERE id = ?", [project.id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn count(&self) -> AppResult<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn find_by_name_on(conn: &Connection, name: &str) -> AppResult<Option<Project>> {
        let project = conn
            .query_row(
                &format!("{} WHERE name = ?", SELECT_PROJECT),
                [Project::normalize_name(name)],
                Self::row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    /// Baustelle per Name holen oder implizit anlegen. Archivierte Baustellen
    /// nehmen keine Buchungen mehr an.
    pub(crate) fn resolve_for_booking(conn: &Connection, name: &str) -> AppResult<Project> {
        if let Some(project) = Self::find_by_name_on(conn, name)? {
            if project.is_archived() {
                return Err(AppError::ProjectArchived(project.name));
            }
            return Ok(project);
        }

        let mut project = Project::new(name);
        project.validate()?;
        conn.execute("INSERT INTO projects (name) VALUES (?1)", [&project.name])?;
        project.id = Some(conn.last_insert_rowid());
        tracing::info!("Baustelle '{}' implizit angelegt", project.name);
        Ok(project)
    }

    fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
        Ok(Project {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            client_name: row.get(2)?,
            address: row.get(3)?,
            status: ProjectStatus::from_db_str(&row.get::<_, String>(4)?),
            is_explicit: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{EntryCategory, NewEntry};

    #[test]
    fn test_create_and_find() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.projects();

        let mut project = Project::new(" Neubau Lindenstraße ")
            .with_client(Some("Familie Krause".into()), Some("Lindenstraße 4".into()));
        let id = repo.create(&mut project).unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name, "Neubau Lindenstraße");
        assert_eq!(found.client_name.as_deref(), Some("Familie Krause"));
        assert_eq!(found.status, ProjectStatus::Active);

        assert!(repo.find_by_name("Neubau Lindenstraße").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.projects();

        repo.create(&mut Project::new("Halle 3")).unwrap();
        let err = repo.create(&mut Project::new(" Halle 3 ")).unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[test]
    fn test_names_with_status() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.projects();

        for name in ["Zeppelinhalle", "Altbau", "Marktplatz"] {
            repo.create(&mut Project::new(name)).unwrap();
        }
        repo.set_status("Marktplatz", ProjectStatus::Archived).unwrap();

        assert_eq!(
            repo.names_with_status(ProjectStatus::Active).unwrap(),
            vec!["Altbau", "Zeppelinhalle"]
        );
        assert_eq!(
            repo.names_with_status(ProjectStatus::Archived).unwrap(),
            vec!["Marktplatz"]
        );
    }

    #[test]
    fn test_set_status_unknown_project() {
        let db = Database::open_in_memory().unwrap();
        let err = db.projects().set_status("Gibt es nicht", ProjectStatus::Archived).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_implicit_project_hidden_without_rows() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .entries()
            .create(&NewEntry::new("Tippfehler", EntryCategory::Notiz, "Neubua"), None)
            .unwrap();
        db.projects().create(&mut Project::new("Leer angelegt")).unwrap();

        assert_eq!(
            db.projects().names_with_status(ProjectStatus::Active).unwrap(),
            vec!["Leer angelegt", "Neubua"]
        );

        db.entries().delete(id).unwrap();
        assert_eq!(
            db.projects().names_with_status(ProjectStatus::Active).unwrap(),
            vec!["Leer angelegt"]
        );
    }

    #[test]
    fn test_delete_blocked_while_referenced() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .entries()
            .create(&NewEntry::new("Aushub", EntryCategory::Aufgabe, "Neubau"), None)
            .unwrap();

        let err = db.projects().delete("Neubau").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        db.entries().delete(id).unwrap();
        db.projects().delete("Neubau").unwrap();
        assert!(db.projects().find_by_name("Neubau").unwrap().is_none());
        assert!(matches!(db.projects().delete("Neubau"), Err(AppError::NotFound(_))));
    }
}
