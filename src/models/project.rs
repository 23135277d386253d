use serde::{Deserialize, Serialize};
use std::fmt;

/// Name der Standard-Baustelle, wenn noch nichts angelegt ist
pub const DEFAULT_PROJECT: &str = "Allgemein";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Active => "Aktiv",
            Self::Archived => "Archiviert",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// Eine Baustelle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<i64>,
    pub name: String,
    pub client_name: Option<String>,
    pub address: Option<String>,
    pub status: ProjectStatus,
    /// Ausdrücklich angelegt; implizite Baustellen verschwinden ohne Einträge aus der Liste
    pub is_explicit: bool,
    pub created_at: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Self::normalize_name(&name.into()),
            client_name: None,
            address: None,
            status: ProjectStatus::Active,
            is_explicit: false,
            created_at: None,
        }
    }

    pub fn with_client(mut self, client_name: Option<String>, address: Option<String>) -> Self {
        self.client_name = client_name.filter(|s| !s.trim().is_empty());
        self.address = address.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn is_archived(&self) -> bool {
        self.status == ProjectStatus::Archived
    }

    /// Nur Leerzeichen am Rand entfernen, der Rest bleibt wie eingegeben
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_string()
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("Baustellenname darf nicht leer sein")]
    EmptyName,
}

impl From<ProjectValidationError> for crate::utils::error::AppError {
    fn from(e: ProjectValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(Project::normalize_name("  Neubau   Müller "), "Neubau   Müller");
        assert_eq!(Project::normalize_name("Haus  A"), "Haus  A");
        assert_eq!(Project::normalize_name("   "), "");
    }

    #[test]
    fn test_validation() {
        assert!(Project::new("Halle 3").validate().is_ok());
        assert!(matches!(
            Project::new("  ").validate(),
            Err(ProjectValidationError::EmptyName)
        ));
    }

    #[test]
    fn test_status_db_roundtrip() {
        for status in [ProjectStatus::Active, ProjectStatus::Archived] {
            assert_eq!(ProjectStatus::from_db_str(&status.to_string()), status);
        }
    }
}
