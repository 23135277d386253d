//! WerkOS - Baustellen-Board, Material, Zeiterfassung und Berichte
//!
//! Eingebettete SQLite-Datenbank plus Medien-Bucket im Dateisystem.

pub mod models;
pub mod db;
pub mod services;
pub mod ui;
pub mod utils;

// Re-exports
pub use db::Database;
pub use models::*;
pub use services::EntryStore;
pub use ui::{AppState, Page};
pub use utils::{AppError, AppResult};
