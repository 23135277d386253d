//! Buchungen mit mehreren Schreibvorgängen
//!
//! Materialverbrauch schreibt einen Kosteneintrag und verringert den Bestand,
//! Zeitbuchungen schreiben einen Kosteneintrag und eine Arbeitszeit. Beide
//! laufen in einer Transaktion: schlägt ein Schritt fehl, bleibt nichts davon
//! übrig.

use serde::Serialize;

use crate::db::{Database, EntryRepository, MaterialRepository, ProjectRepository, StaffRepository};
use crate::models::{
    validate_hours, EntryCategory, EntryStatus, Material, NewEntry, Staff, WorkHours,
};
use crate::utils::error::{AppError, AppResult};

/// Ergebnis einer Materialbuchung
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionBooking {
    pub entry_id: i64,
    pub material: Material,
    pub quantity: f64,
    pub cost: f64,
    pub remaining_stock: f64,
}

impl ConsumptionBooking {
    pub fn is_overdrawn(&self) -> bool {
        self.remaining_stock < 0.0
    }

    /// Restbestand auf oder unter dem Mindestbestand
    pub fn needs_reorder(&self) -> bool {
        Material {
            stock_quantity: self.remaining_stock,
            ..self.material.clone()
        }
        .is_low_stock()
    }
}

/// Ergebnis einer Zeitbuchung
#[derive(Debug, Clone, Serialize)]
pub struct TimeBooking {
    pub entry_id: i64,
    pub work_hours_id: i64,
    pub staff: Staff,
    pub hours: f64,
    pub cost: f64,
}

pub struct BookingService<'a> {
    db: &'a Database,
    allow_negative_stock: bool,
    user_id: Option<&'a str>,
}

impl<'a> BookingService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            allow_negative_stock: true,
            user_id: None,
        }
    }

    pub fn allow_negative_stock(mut self, allow: bool) -> Self {
        self.allow_negative_stock = allow;
        self
    }

    pub fn stamped_by(mut self, user_id: Option<&'a str>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Materialverbrauch buchen: Kosten = Menge × Preis, Bestand -= Menge
    pub fn book_material_consumption(
        &self,
        material_name: &str,
        project: &str,
        quantity: f64,
    ) -> AppResult<ConsumptionBooking> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::validation("Verbrauchsmenge muss größer als 0 sein"));
        }

        let booking = self.db.with_transaction(|tx| {
            let material = MaterialRepository::find_by_name_on(tx, material_name)?
                .ok_or_else(|| AppError::not_found(format!("Material '{}'", material_name)))?;
            let material_id = material
                .id
                .ok_or_else(|| AppError::other("Material ohne ID"))?;
            let project = ProjectRepository::resolve_for_booking(tx, project)?;

            let cost = material.cost_for(quantity);
            let mut entry = NewEntry::new(
                format!("Verbrauch: {} {} {}", quantity, material.unit, material.name),
                EntryCategory::Material,
                project.name.clone(),
            )
            .with_cost(cost)
            .with_status(EntryStatus::Ok);
            entry.material_id = Some(material_id);

            let entry_id = EntryRepository::insert_on(
                tx,
                project.id.unwrap_or_default(),
                &entry,
                self.user_id,
            )?;
            let remaining_stock = MaterialRepository::adjust_stock_on(tx, material_id, -quantity)?;

            if remaining_stock < 0.0 && !self.allow_negative_stock {
                return Err(AppError::validation(format!(
                    "Nicht genug {} auf Lager ({} {} verfügbar)",
                    material.name, material.stock_quantity, material.unit
                )));
            }

            Ok(ConsumptionBooking {
                entry_id,
                material,
                quantity,
                cost,
                remaining_stock,
            })
        })?;

        tracing::info!(
            "Verbrauch gebucht: {} {} {} auf '{}' ({:.2} €)",
            booking.quantity,
            booking.material.unit,
            booking.material.name,
            project,
            booking.cost
        );
        if booking.is_overdrawn() {
            tracing::warn!(
                "Bestand von '{}' ist negativ: {}",
                booking.material.name,
                booking.remaining_stock
            );
        } else if booking.needs_reorder() {
            tracing::info!(
                "'{}' nachbestellen: {} {} übrig",
                booking.material.name,
                booking.remaining_stock,
                booking.material.unit
            );
        }

        Ok(booking)
    }

    /// Arbeitszeit buchen: Kosten = Stunden × Stundensatz
    pub fn book_staff_time(
        &self,
        staff_name: &str,
        project: &str,
        hours: f64,
        description: Option<&str>,
    ) -> AppResult<TimeBooking> {
        validate_hours(hours)?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let booking = self.db.with_transaction(|tx| {
            let staff = StaffRepository::find_by_name_on(tx, staff_name)?
                .ok_or_else(|| AppError::not_found(format!("Mitarbeiter '{}'", staff_name)))?;
            let project = ProjectRepository::resolve_for_booking(tx, project)?;
            let project_id = project.id.unwrap_or_default();

            let cost = staff.cost_for(hours);
            let content = match description {
                Some(d) => format!("Arbeitszeit {}: {} h ({})", staff.name, hours, d),
                None => format!("Arbeitszeit {}: {} h", staff.name, hours),
            };
            let entry = NewEntry::new(content, EntryCategory::Aufgabe, project.name.clone())
                .with_cost(cost)
                .with_status(EntryStatus::Ok);
            let entry_id = EntryRepository::insert_on(tx, project_id, &entry, self.user_id)?;

            let mut work_hours = WorkHours::new(project_id, staff.name.clone(), hours);
            work_hours.description = description.map(str::to_string);
            work_hours.user_id = self.user_id.map(str::to_string);
            let work_hours_id = StaffRepository::insert_work_hours_on(tx, &work_hours)?;

            Ok(TimeBooking {
                entry_id,
                work_hours_id,
                staff,
                hours,
                cost,
            })
        })?;

        tracing::info!(
            "Zeit gebucht: {} h für {} auf '{}' ({:.2} €)",
            booking.hours,
            booking.staff.name,
            project,
            booking.cost
        );
        Ok(booking)
    }
}
