use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::project::DEFAULT_PROJECT;
use crate::utils::path::project_dirs;

/// Anwendungseinstellungen (settings.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub database_path: PathBuf,
    pub media_directory: PathBuf,
    /// Unterverzeichnis für hochgeladene Fotos und Sprachaufnahmen
    pub media_bucket: String,
    /// Öffentliche Basis-URL des Buckets, sonst file://-URLs
    pub public_base_url: Option<String>,
    pub currency: String,
    pub default_project: String,
    /// Verbrauch über den Bestand hinaus zulassen
    pub allow_negative_stock: bool,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self {
            database_path: data_dir.join("werkos.db"),
            media_directory: data_dir.join("media"),
            media_bucket: "baustellen-fotos".to_string(),
            public_base_url: None,
            currency: "EUR".to_string(),
            default_project: DEFAULT_PROJECT.to_string(),
            allow_negative_stock: true,
            log_level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Einstellungen aus der Standarddatei laden
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    pub fn bucket_directory(&self) -> PathBuf {
        self.media_directory.join(&self.media_bucket)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

/// Angemeldeter Benutzer; `id` wird als `user_id` an Zeilen gestempelt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}
