use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum EntryCategory {
    #[default]
    Notiz,
    Aufgabe,
    Material,
    Wichtig,
}

impl EntryCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Notiz => "Notiz",
            Self::Aufgabe => "Aufgabe",
            Self::Material => "Material",
            Self::Wichtig => "Wichtig",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Notiz" => Some(Self::Notiz),
            "Aufgabe" => Some(Self::Aufgabe),
            "Material" => Some(Self::Material),
            "Wichtig" => Some(Self::Wichtig),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Notiz, Self::Aufgabe, Self::Material, Self::Wichtig]
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ampelstatus eines Eintrags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum EntryStatus {
    Ok,
    #[default]
    InArbeit,
    Dringend,
}

impl EntryStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::InArbeit => "In Arbeit",
            Self::Dringend => "Dringend",
        }
    }

    /// Akzeptiert auch die alten Labels mit Ampel-Emoji ("🟡 In Arbeit")
    pub fn from_db_str(s: &str) -> Option<Self> {
        let label = s
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim();
        match label {
            "Ok" => Some(Self::Ok),
            "In Arbeit" => Some(Self::InArbeit),
            "Dringend" => Some(Self::Dringend),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Ok, Self::InArbeit, Self::Dringend]
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ein Eintrag auf dem Baustellen-Board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub project_id: i64,
    pub project_name: String,
    pub content: String,
    pub category: EntryCategory,
    pub status: EntryStatus,
    pub cost_amount: f64,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub material_id: Option<i64>,
    pub user_id: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub created_at: Option<String>,
}

/// Formulardaten für einen neuen Eintrag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    pub content: String,
    pub category: EntryCategory,
    pub status: EntryStatus,
    pub project_name: String,
    pub cost_amount: f64,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub material_id: Option<i64>,
}

impl NewEntry {
    pub fn new(content: impl Into<String>, category: EntryCategory, project_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category,
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    pub fn with_cost(mut self, cost_amount: f64) -> Self {
        self.cost_amount = cost_amount;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.content.trim().is_empty() {
            return Err(EntryValidationError::EmptyContent);
        }
        validate_cost(self.cost_amount)
    }
}

/// Partielle Änderung; `None` lässt das Feld unverändert
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub content: Option<String>,
    pub category: Option<EntryCategory>,
    pub status: Option<EntryStatus>,
    pub cost_amount: Option<f64>,
    /// `Some(None)` entfernt die Bild-URL
    pub image_url: Option<Option<String>>,
    pub audio_url: Option<Option<String>>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.cost_amount.is_none()
            && self.image_url.is_none()
            && self.audio_url.is_none()
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err(EntryValidationError::EmptyContent);
            }
        }
        if let Some(cost) = self.cost_amount {
            validate_cost(cost)?;
        }
        Ok(())
    }
}

fn validate_cost(cost: f64) -> Result<(), EntryValidationError> {
    if !cost.is_finite() {
        return Err(EntryValidationError::InvalidCost);
    }
    if cost < 0.0 {
        return Err(EntryValidationError::NegativeCost);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum EntryValidationError {
    #[error("Titel / Beschreibung darf nicht leer sein")]
    EmptyContent,
    #[error("Kosten dürfen nicht negativ sein")]
    NegativeCost,
    #[error("Kosten sind keine gültige Zahl")]
    InvalidCost,
}

impl From<EntryValidationError> for crate::utils::error::AppError {
    fn from(e: EntryValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_legacy_labels() {
        assert_eq!(EntryStatus::from_db_str("🟢 Ok"), Some(EntryStatus::Ok));
        assert_eq!(EntryStatus::from_db_str("🟡 In Arbeit"), Some(EntryStatus::InArbeit));
        assert_eq!(EntryStatus::from_db_str("🔴 Dringend"), Some(EntryStatus::Dringend));
        assert_eq!(EntryStatus::from_db_str("Dringend"), Some(EntryStatus::Dringend));
        assert_eq!(EntryStatus::from_db_str("kaputt"), None);
    }

    #[test]
    fn test_defaults() {
        let entry = NewEntry::new("Gerüst prüfen", EntryCategory::Aufgabe, "Halle 3");
        assert_eq!(entry.status, EntryStatus::InArbeit);
        assert_eq!(entry.cost_amount, 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(NewEntry::new("Beton", EntryCategory::Material, "X").with_cost(12.5).validate().is_ok());
        assert!(matches!(
            NewEntry::new("   ", EntryCategory::Notiz, "X").validate(),
            Err(EntryValidationError::EmptyContent)
        ));
        assert!(matches!(
            NewEntry::new("Beton", EntryCategory::Notiz, "X").with_cost(-1.0).validate(),
            Err(EntryValidationError::NegativeCost)
        ));
        assert!(matches!(
            NewEntry::new("Beton", EntryCategory::Notiz, "X").with_cost(f64::NAN).validate(),
            Err(EntryValidationError::InvalidCost)
        ));
    }
}
