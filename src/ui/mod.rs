//! Zustand der Oberfläche, unabhängig vom Rendering

pub mod state;

pub use state::{AppState, ConfirmAction, EntryFormData, Page, StatusType};
