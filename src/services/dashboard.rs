//! Kennzahlen einer Baustelle

use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::{Database, EntryFilter};
use crate::models::{EntryCategory, Material, Project};
use crate::utils::error::AppResult;

/// Summe aller Kosten; fehlende Beträge zählen als 0
pub fn total_cost(amounts: &[(EntryCategory, f64)]) -> f64 {
    amounts.iter().map(|(_, cost)| cost).sum()
}

/// Kosten je Kategorie in Deklarationsreihenfolge, nur belegte Kategorien
pub fn costs_by_category(amounts: &[(EntryCategory, f64)]) -> Vec<(EntryCategory, f64)> {
    let mut sums: BTreeMap<EntryCategory, f64> = BTreeMap::new();
    for (category, cost) in amounts {
        *sums.entry(*category).or_insert(0.0) += cost;
    }
    sums.into_iter().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub project: String,
    pub total_cost: f64,
    pub costs_by_category: Vec<(EntryCategory, f64)>,
    pub open_entries: usize,
    pub completed_entries: usize,
    pub booked_hours: f64,
    pub low_stock: Vec<Material>,
}

impl DashboardSummary {
    pub fn load(db: &Database, project: &str) -> AppResult<Self> {
        let amounts = db.entries().cost_amounts(project)?;
        let entries = db.entries().find(&EntryFilter::project(project))?;
        let completed_entries = entries.iter().filter(|e| e.is_completed).count();
        let booked_hours: f64 = db
            .staff()
            .hours_by_worker(project)?
            .iter()
            .map(|(_, hours)| hours)
            .sum();

        Ok(Self {
            project: Project::normalize_name(project),
            total_cost: total_cost(&amounts),
            costs_by_category: costs_by_category(&amounts),
            open_entries: entries.len() - completed_entries,
            completed_entries,
            booked_hours,
            low_stock: db.materials().find_low_stock()?,
        })
    }

    /// Textausgabe für die Konsole
    pub fn render_text(&self, currency: &str) -> String {
        let mut out = format!(
            "Baustelle: {}\nGesamtkosten: {:.2} {}\n",
            self.project, self.total_cost, currency
        );
        for (category, sum) in &self.costs_by_category {
            out.push_str(&format!("  {:<10} {:>10.2} {}\n", category.display_name(), sum, currency));
        }
        out.push_str(&format!(
            "Einträge: {} offen, {} erledigt\nStunden: {}\n",
            self.open_entries, self.completed_entries, self.booked_hours
        ));
        for material in &self.low_stock {
            out.push_str(&format!(
                "Nachbestellen: {} ({} {}, Mindestbestand {})\n",
                material.name, material.stock_quantity, material.unit, material.min_stock
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;

    #[test]
    fn test_total_cost() {
        let amounts = vec![
            (EntryCategory::Notiz, 10.0),
            (EntryCategory::Aufgabe, 0.0),
            (EntryCategory::Material, 5.5),
        ];
        assert_eq!(total_cost(&amounts), 15.5);
        assert_eq!(total_cost(&[]), 0.0);
    }

    #[test]
    fn test_costs_by_category_order() {
        let amounts = vec![
            (EntryCategory::Wichtig, 1.0),
            (EntryCategory::Notiz, 2.0),
            (EntryCategory::Wichtig, 0.5),
            (EntryCategory::Material, 0.25),
        ];
        assert_eq!(
            costs_by_category(&amounts),
            vec![
                (EntryCategory::Notiz, 2.0),
                (EntryCategory::Material, 0.25),
                (EntryCategory::Wichtig, 1.5),
            ]
        );
    }

    #[test]
    fn test_load_summary() {
        let db = Database::open_in_memory().unwrap();
        let entries = db.entries();
        let id = entries
            .create(&NewEntry::new("Gerüst", EntryCategory::Aufgabe, "Neubau").with_cost(120.0), None)
            .unwrap();
        entries.create(&NewEntry::new("Notiz", EntryCategory::Notiz, "Neubau"), None).unwrap();
        entries.complete(id).unwrap();

        let summary = DashboardSummary::load(&db, "Neubau").unwrap();
        assert_eq!(summary.total_cost, 120.0);
        assert_eq!(summary.open_entries, 1);
        assert_eq!(summary.completed_entries, 1);
        assert!(summary.render_text("EUR").contains("Gesamtkosten: 120.00 EUR"));
    }
}
