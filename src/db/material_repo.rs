use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::models::Material;
use crate::utils::error::{AppError, AppResult};

const SELECT_MATERIAL: &str =
    "SELECT id, name, unit, price_per_unit, stock_quantity, min_stock, created_at FROM materials";

pub struct MaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn find_all(&self) -> AppResult<Vec<Material>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY name", SELECT_MATERIAL))?;
        let materials = stmt
            .query_map([], Self::row_to_material)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    pub fn find_by_id(&self, id: i64) -> AppResult<Option<Material>> {
        let conn = lock(&self.conn)?;
        let material = conn
            .query_row(&format!("{} WHERE id = ?", SELECT_MATERIAL), [id], Self::row_to_material)
            .optional()?;
        Ok(material)
    }

    pub fn find_by_name(&self, name: &str) -> AppResult<Option<Material>> {
        let conn = lock(&self.conn)?;
        Self::find_by_name_on(&conn, name)
    }

    /// Materialien mit Bestand auf oder unter dem Mindestbestand
    pub fn find_low_stock(&self) -> AppResult<Vec<Material>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE stock_quantity <= min_stock ORDER BY stock_quantity - min_stock, name",
            SELECT_MATERIAL
        ))?;
        let materials = stmt
            .query_map([], Self::row_to_material)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    pub fn create(&self, material: &mut Material) -> AppResult<i64> {
        material.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO materials (name, unit, price_per_unit, stock_quantity, min_stock)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                material.name,
                material.unit,
                material.price_per_unit,
                material.stock_quantity,
                material.min_stock,
            ],
        )
        .map_err(|e| AppError::from_unique_violation(e, format!("Material '{}'", material.name)))?;

        let id = conn.last_insert_rowid();
        material.id = Some(id);
        Ok(id)
    }

    /// Inventurkorrektur: Bestand direkt überschreiben
    pub fn set_stock(&self, id: i64, stock_quantity: f64) -> AppResult<()> {
        if !stock_quantity.is_finite() {
            return Err(AppError::validation("Bestand ist keine gültige Zahl"));
        }

        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE materials SET stock_quantity = ?1 WHERE id = ?2",
            params![stock_quantity, id],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("Material {}", id)));
        }
        Ok(())
    }

    pub(crate) fn find_by_name_on(conn: &Connection, name: &str) -> AppResult<Option<Material>> {
        let material = conn
            .query_row(
                &format!("{} WHERE name = ?", SELECT_MATERIAL),
                [name.trim()],
                Self::row_to_material,
            )
            .optional()?;
        Ok(material)
    }

    /// Bestand um `delta` verändern, gibt den neuen Bestand zurück
    pub(crate) fn adjust_stock_on(conn: &Connection, id: i64, delta: f64) -> AppResult<f64> {
        let rows = conn.execute(
            "UPDATE materials SET stock_quantity = stock_quantity + ?1 WHERE id = ?2",
            params![delta, id],
        )?;
        if rows == 0 {
            return Err(AppError::not_found(format!("Material {}", id)));
        }

        let stock = conn.query_row(
            "SELECT stock_quantity FROM materials WHERE id = ?",
            [id],
            |row| row.get(0),
        )?;
        Ok(stock)
    }

    fn row_to_material(row: &Row) -> rusqlite::Result<Material> {
        Ok(Material {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            unit: row.get(2)?,
            price_per_unit: row.get(3)?,
            stock_quantity: row.get(4)?,
            min_stock: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_create_and_correct_stock() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.materials();

        let mut cement = Material::new("Zement", "Sack", 10.0).with_stock(20.0, 5.0);
        let id = repo.create(&mut cement).unwrap();

        repo.set_stock(id, 12.5).unwrap();
        let found = repo.find_by_name("Zement").unwrap().unwrap();
        assert_eq!(found.stock_quantity, 12.5);
        assert_eq!(found.price_per_unit, 10.0);

        assert!(matches!(repo.set_stock(999, 1.0), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.materials();

        repo.create(&mut Material::new("Kies", "t", 20.0)).unwrap();
        let err = repo.create(&mut Material::new("Kies", "t", 25.0)).unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[test]
    fn test_find_low_stock_includes_threshold() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.materials();

        repo.create(&mut Material::new("Zement", "Sack", 10.0).with_stock(5.0, 5.0)).unwrap();
        repo.create(&mut Material::new("Kies", "t", 20.0).with_stock(50.0, 10.0)).unwrap();
        repo.create(&mut Material::new("Sand", "t", 15.0).with_stock(-1.0, 2.0)).unwrap();

        let low: Vec<String> = repo.find_low_stock().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(low, vec!["Sand", "Zement"]);
    }
}
