//! WerkOS - Einstiegspunkt
//!
//! Öffnet die Datenbank und gibt die Kennzahlen einer Baustelle aus.

use anyhow::Context;

use werkos::utils::path::display_path;
use werkos::{AppSettings, EntryStore};

fn main() -> anyhow::Result<()> {
    let settings_path = AppSettings::default_path();
    let (settings, load_error) = match AppSettings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (AppSettings::default(), Some(e)),
    };

    // Logging initialisieren
    tracing_subscriber::fmt()
        .with_max_level(settings.tracing_level())
        .with_target(false)
        .init();

    tracing::info!("Starte WerkOS v{}", env!("CARGO_PKG_VERSION"));

    match load_error {
        Some(e) if settings_path.exists() => {
            tracing::warn!(
                "Einstellungen {} unlesbar, nutze Standardwerte: {}",
                display_path(&settings_path),
                e
            );
        }
        Some(_) => match settings.save() {
            Ok(()) => tracing::info!("Standardeinstellungen angelegt: {}", display_path(&settings_path)),
            Err(e) => tracing::warn!("Einstellungen konnten nicht gespeichert werden: {}", e),
        },
        None => tracing::debug!("Einstellungen geladen: {}", display_path(&settings_path)),
    }
    tracing::info!("Datenbank: {}", display_path(&settings.database_path));

    let store = EntryStore::open(settings).with_context(|| "Datenbank konnte nicht geöffnet werden")?;

    let project = match std::env::args().nth(1) {
        Some(name) => name,
        None => store
            .list_projects()
            .into_iter()
            .next()
            .unwrap_or_else(|| store.settings().default_project.clone()),
    };

    let summary = store.dashboard(&project)?;
    print!("{}", summary.render_text(&store.settings().currency));

    Ok(())
}
