use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::models::{Project, Staff, WorkHours};
use crate::utils::error::{AppError, AppResult};

/// Repository für Personal und Arbeitszeiten
pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn find_all(&self) -> AppResult<Vec<Staff>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name, hourly_rate FROM staff ORDER BY name")?;
        let staff = stmt
            .query_map([], Self::row_to_staff)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(staff)
    }

    pub fn find_by_name(&self, name: &str) -> AppResult<Option<Staff>> {
        let conn = lock(&self.conn)?;
        Self::find_by_name_on(&conn, name)
    }

    pub fn create(&self, staff: &mut Staff) -> AppResult<i64> {
        staff.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO staff (name, hourly_rate) VALUES (?1, ?2)",
            params![staff.name, staff.hourly_rate],
        )
        .map_err(|e| AppError::from_unique_violation(e, format!("Mitarbeiter '{}'", staff.name)))?;

        let id = conn.last_insert_rowid();
        staff.id = Some(id);
        Ok(id)
    }

    /// Arbeitszeiten einer Baustelle, neueste zuerst
    pub fn work_hours_for_project(&self, project: &str) -> AppResult<Vec<WorkHours>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT w.id, w.project_id, w.worker_name, w.hours, w.description, w.user_id, w.created_at
             FROM work_hours w
             INNER JOIN projects p ON p.id = w.project_id
             WHERE p.name = ?
             ORDER BY w.created_at DESC, w.id DESC",
        )?;

        let hours = stmt
            .query_map([Project::normalize_name(project)], Self::row_to_work_hours)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hours)
    }

    /// Stunden je Mitarbeiter auf einer Baustelle, nach Name sortiert
    pub fn hours_by_worker(&self, project: &str) -> AppResult<Vec<(String, f64)>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT w.worker_name, SUM(w.hours)
             FROM work_hours w
             INNER JOIN projects p ON p.id = w.project_id
             WHERE p.name = ?
             GROUP BY w.worker_name
             ORDER BY w.worker_name",
        )?;

        let rows = stmt
            .query_map([Project::normalize_name(project)], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub(crate) fn find_by_name_on(conn: &Connection, name: &str) -> AppResult<Option<Staff>> {
        let staff = conn
            .query_row(
                "SELECT id, name, hourly_rate FROM staff WHERE name = ?",
                [name.trim()],
                Self::row_to_staff,
            )
            .optional()?;
        Ok(staff)
    }

    pub(crate) fn insert_work_hours_on(conn: &Connection, hours: &WorkHours) -> AppResult<i64> {
        conn.execute(
            "INSERT INTO work_hours (project_id, worker_name, hours, description, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                hours.project_id,
                hours.worker_name,
                hours.hours,
                hours.description,
                hours.user_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn row_to_staff(row: &Row) -> rusqlite::Result<Staff> {
        Ok(Staff {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            hourly_rate: row.get(2)?,
        })
    }

    fn row_to_work_hours(row: &Row) -> rusqlite::Result<WorkHours> {
        Ok(WorkHours {
            id: Some(row.get(0)?),
            project_id: row.get(1)?,
            worker_name: row.get(2)?,
            hours: row.get(3)?,
            description: row.get(4)?,
            user_id: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_create_and_list() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.staff();

        repo.create(&mut Staff::new("Maurer Kurt", 42.0)).unwrap();
        repo.create(&mut Staff::new("Azubi Lena", 18.5)).unwrap();

        let names: Vec<String> = repo.find_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Azubi Lena", "Maurer Kurt"]);
        assert_eq!(repo.find_by_name(" Maurer Kurt ").unwrap().unwrap().hourly_rate, 42.0);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db.staff().create(&mut Staff::new("Kurt", -5.0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
