use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::models::{
    Entry, EntryCategory, EntryStatus, EntryUpdate, NewEntry, SessionUser, DEFAULT_PROJECT,
};

/// Aktuelle Seite der Anwendung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Board,
    Materials,
    TimeTracking,
    Dashboard,
}

impl Page {
    pub fn display_name(&self) -> &'static str {
        match self {
            Page::Board => "Baustellen-Board",
            Page::Materials => "Material & Lager",
            Page::TimeTracking => "Zeiterfassung",
            Page::Dashboard => "Dashboard",
        }
    }

    pub fn all() -> &'static [Page] {
        &[Page::Board, Page::Materials, Page::TimeTracking, Page::Dashboard]
    }
}

/// Zentraler Anwendungszustand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    pub current_page: Page,

    /// Gewählte Baustelle
    pub current_project: String,

    /// Eintrag in Bearbeitung (None = kein Formular offen)
    pub editing_entry_id: Option<i64>,
    pub entry_form: EntryFormData,

    pub user: Option<SessionUser>,

    #[serde(skip)]
    pub confirm_action: Option<ConfirmAction>,

    #[serde(skip)]
    pub status_message: Option<StatusMessage>,

    /// Erledigte Einträge auf dem Board anzeigen
    pub show_completed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_page: Page::default(),
            current_project: DEFAULT_PROJECT.to_string(),
            editing_entry_id: None,
            entry_form: EntryFormData::default(),
            user: None,
            confirm_action: None,
            status_message: None,
            show_completed: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&mut self, page: Page) {
        self.current_page = page;
    }

    /// Baustelle wechseln; ein offenes Formular gehört zur alten Baustelle
    pub fn select_project(&mut self, project: &str) {
        let project = project.trim();
        if project.is_empty() || project == self.current_project {
            return;
        }
        self.current_project = project.to_string();
        self.cancel_edit();
    }

    /// Ist die gewählte Baustelle noch in der Liste? Sonst die erste nehmen.
    pub fn sync_projects(&mut self, projects: &[String]) {
        if !projects.iter().any(|p| p == &self.current_project) {
            if let Some(first) = projects.first() {
                self.select_project(first);
            }
        }
    }

    pub fn begin_edit(&mut self, entry: &Entry) {
        self.editing_entry_id = Some(entry.id);
        self.entry_form = EntryFormData::from_entry(entry);
        self.current_page = Page::Board;
    }

    pub fn cancel_edit(&mut self) {
        self.editing_entry_id = None;
        self.entry_form.clear();
    }

    pub fn is_editing(&self, id: i64) -> bool {
        self.editing_entry_id == Some(id)
    }

    pub fn sign_in(&mut self, user: SessionUser) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.cancel_edit();
    }

    pub fn request_confirm(&mut self, action: ConfirmAction) {
        self.confirm_action = Some(action);
    }

    /// Bestätigte Aktion entnehmen
    pub fn take_confirmed(&mut self) -> Option<ConfirmAction> {
        self.confirm_action.take()
    }

    pub fn show_status(&mut self, message: &str, status_type: StatusType) {
        self.status_message = Some(StatusMessage {
            text: message.to_string(),
            status_type,
            created_at: Instant::now(),
        });
    }

    pub fn show_success(&mut self, message: &str) {
        self.show_status(message, StatusType::Success);
    }

    pub fn show_error(&mut self, message: &str) {
        self.show_status(message, StatusType::Error);
    }

    /// Statusmeldung nach 5 Sekunden entfernen
    pub fn clear_old_status(&mut self) {
        if let Some(ref status) = self.status_message {
            if status.created_at.elapsed().as_secs() > 5 {
                self.status_message = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteEntry(i64),
    ArchiveProject(String),
    PurgeOrphanedMedia,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub status_type: StatusType,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
    Info,
    Warning,
}

/// Formulardaten für einen Eintrag
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFormData {
    pub content: String,
    pub category: EntryCategory,
    pub status: EntryStatus,
    pub cost_amount: f64,
}

impl EntryFormData {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            content: entry.content.clone(),
            category: entry.category,
            status: entry.status,
            cost_amount: entry.cost_amount,
        }
    }

    pub fn to_new_entry(&self, project: &str) -> NewEntry {
        NewEntry::new(self.content.clone(), self.category, project)
            .with_cost(self.cost_amount)
            .with_status(self.status)
    }

    pub fn to_update(&self) -> EntryUpdate {
        EntryUpdate {
            content: Some(self.content.clone()),
            category: Some(self.category),
            status: Some(self.status),
            cost_amount: Some(self.cost_amount),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64) -> Entry {
        Entry {
            id,
            project_id: 1,
            project_name: "Neubau".into(),
            content: "Dach decken".into(),
            category: EntryCategory::Aufgabe,
            status: EntryStatus::Dringend,
            cost_amount: 250.0,
            image_url: None,
            audio_url: None,
            material_id: None,
            user_id: None,
            is_completed: false,
            completed_at: None,
            created_at: None,
        }
    }

    #[test]
    fn test_defaults() {
        let state = AppState::new();
        assert_eq!(state.current_page, Page::Board);
        assert_eq!(state.current_project, "Allgemein");
        assert!(state.editing_entry_id.is_none());
    }

    #[test]
    fn test_edit_cycle() {
        let mut state = AppState::new();
        state.navigate(Page::Dashboard);
        state.begin_edit(&entry(7));

        assert!(state.is_editing(7));
        assert_eq!(state.current_page, Page::Board);
        assert_eq!(state.entry_form.cost_amount, 250.0);
        assert_eq!(state.entry_form.to_update().status, Some(EntryStatus::Dringend));

        state.cancel_edit();
        assert!(!state.is_editing(7));
        assert!(state.entry_form.content.is_empty());
    }

    #[test]
    fn test_switching_project_cancels_edit() {
        let mut state = AppState::new();
        state.begin_edit(&entry(3));
        state.select_project("Neubau");

        assert_eq!(state.current_project, "Neubau");
        assert!(state.editing_entry_id.is_none());

        state.sync_projects(&["Altbau".to_string()]);
        assert_eq!(state.current_project, "Altbau");
    }

    #[test]
    fn test_confirm_is_taken_once() {
        let mut state = AppState::new();
        state.request_confirm(ConfirmAction::DeleteEntry(5));
        assert_eq!(state.take_confirmed(), Some(ConfirmAction::DeleteEntry(5)));
        assert_eq!(state.take_confirmed(), None);
    }

    #[test]
    fn test_sign_out_drops_user_and_form() {
        let mut state = AppState::new();
        state.sign_in(SessionUser {
            id: "u-1".into(),
            email: "polier@example.org".into(),
        });
        state.begin_edit(&entry(2));
        assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u-1"));

        state.sign_out();
        assert!(state.user.is_none());
        assert!(!state.is_editing(2));
    }

    #[test]
    fn test_fresh_status_is_kept() {
        let mut state = AppState::new();
        state.show_success("Gespeichert");
        state.clear_old_status();

        let status = state.status_message.as_ref().unwrap();
        assert_eq!(status.text, "Gespeichert");
        assert_eq!(status.status_type, StatusType::Success);
    }

    #[test]
    fn test_form_to_new_entry() {
        let mut state = AppState::new();
        state.begin_edit(&entry(1));

        let new = state.entry_form.to_new_entry("Altbau");
        assert_eq!(new.content, "Dach decken");
        assert_eq!(new.project_name, "Altbau");
        assert_eq!(new.status, EntryStatus::Dringend);
        assert_eq!(new.cost_amount, 250.0);
    }

    #[test]
    fn test_serializes_without_transient_fields() {
        let mut state = AppState::new();
        state.show_error("Fehler");
        state.select_project("Neubau");

        let json = serde_json::to_string(&state).unwrap();
        let restored: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_project, "Neubau");
        assert!(restored.status_message.is_none());
    }
}
