//! Fassade über Datenbank und Medien-Bucket
//!
//! Alle Bildschirme gehen über `EntryStore`; Aufrufer sehen nur Modelle und
//! `AppResult`, keine SQL-Details.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::db::{Database, EntryFilter};
use crate::models::{
    AppSettings, Entry, EntryCategory, EntryStatus, EntryUpdate, Material, NewEntry, Project,
    ProjectStatus, SessionUser, Staff, WorkHours, DEFAULT_PROJECT,
};
use crate::services::booking::{BookingService, ConsumptionBooking, TimeBooking};
use crate::services::dashboard::{costs_by_category, total_cost, DashboardSummary};
use crate::services::media::{MediaKind, MediaStore, StoredMedia};
use crate::services::report::{render_pdf, ExportFormat, ReportService};
use crate::utils::date::{capture_filename, now_local, photo_caption, voice_memo_caption};
use crate::utils::error::{AppError, AppResult};

pub struct EntryStore {
    db: Database,
    settings: AppSettings,
    media: MediaStore,
    user: Option<SessionUser>,
}

impl EntryStore {
    pub fn new(db: Database, settings: AppSettings) -> Self {
        let media = MediaStore::from_settings(&settings);
        Self {
            db,
            settings,
            media,
            user: None,
        }
    }

    /// Datenbank aus den Einstellungen öffnen
    pub fn open(settings: AppSettings) -> AppResult<Self> {
        let db = Database::open(&settings.database_path)?;
        db.migrate()?;
        Ok(Self::new(db, settings))
    }

    /// Schreibende Operationen mit der Benutzer-ID stempeln
    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    fn default_project(&self) -> String {
        let name = Project::normalize_name(&self.settings.default_project);
        if name.is_empty() {
            DEFAULT_PROJECT.to_string()
        } else {
            name
        }
    }

    fn bookings(&self) -> BookingService<'_> {
        BookingService::new(&self.db)
            .allow_negative_stock(self.settings.allow_negative_stock)
            .stamped_by(self.user_id())
    }

    // --- Baustellen ---

    /// Aktive Baustellen, sortiert. Leer oder bei Fehlern: nur die Standard-Baustelle.
    pub fn list_projects(&self) -> Vec<String> {
        match self.fetch_projects() {
            Ok(names) if !names.is_empty() => names,
            Ok(_) => vec![self.default_project()],
            Err(e) => {
                tracing::warn!("Baustellen konnten nicht geladen werden: {}", e);
                vec![self.default_project()]
            }
        }
    }

    pub fn fetch_projects(&self) -> AppResult<Vec<String>> {
        self.db.projects().names_with_status(ProjectStatus::Active)
    }

    pub fn list_archived_projects(&self) -> AppResult<Vec<String>> {
        self.db.projects().names_with_status(ProjectStatus::Archived)
    }

    pub fn project(&self, name: &str) -> AppResult<Option<Project>> {
        self.db.projects().find_by_name(name)
    }

    pub fn create_project(
        &self,
        name: &str,
        client_name: Option<String>,
        address: Option<String>,
    ) -> AppResult<Project> {
        let mut project = Project::new(name).with_client(client_name, address);
        self.db.projects().create(&mut project)?;
        tracing::info!("Baustelle '{}' angelegt", project.name);
        Ok(project)
    }

    pub fn archive_project(&self, name: &str) -> AppResult<()> {
        self.db.projects().set_status(name, ProjectStatus::Archived)?;
        tracing::info!("Baustelle '{}' archiviert", name.trim());
        Ok(())
    }

    /// Nur möglich, solange keine Einträge oder Arbeitszeiten darauf verweisen
    pub fn delete_project(&self, name: &str) -> AppResult<()> {
        self.db.projects().delete(name)?;
        tracing::info!("Baustelle '{}' gelöscht", name.trim());
        Ok(())
    }

    // --- Einträge ---

    pub fn create_entry(&self, entry: NewEntry) -> AppResult<i64> {
        let id = self.db.entries().create(&entry, self.user_id())?;
        tracing::debug!("Eintrag {} auf '{}' angelegt", id, entry.project_name.trim());
        Ok(id)
    }

    /// Erledigt markieren; wiederholte Aufrufe und unbekannte IDs ändern nichts
    pub fn complete_entry(&self, id: i64) -> AppResult<()> {
        if !self.db.entries().complete(id)? {
            tracing::debug!("Eintrag {} war bereits erledigt oder fehlt", id);
        }
        Ok(())
    }

    pub fn update_entry(&self, id: i64, update: EntryUpdate) -> AppResult<()> {
        self.db.entries().update(id, &update)
    }

    /// Endgültig löschen; das Medium im Bucket bleibt erhalten
    pub fn delete_entry(&self, id: i64) -> AppResult<()> {
        if self.db.entries().delete(id)? {
            tracing::info!("Eintrag {} gelöscht", id);
        }
        Ok(())
    }

    pub fn entry(&self, id: i64) -> AppResult<Option<Entry>> {
        self.db.entries().find_by_id(id)
    }

    /// Einträge einer Baustelle, neueste zuerst
    pub fn list_entries(&self, project: &str, completed: bool) -> AppResult<Vec<Entry>> {
        self.db
            .entries()
            .find(&EntryFilter::project(project).completed(completed))
    }

    // --- Medien ---

    /// Blob hochladen, gibt die öffentliche URL zurück
    pub fn upload_media(&self, bytes: &[u8], filename: &str) -> AppResult<String> {
        Ok(self.media.upload(bytes, filename)?.url)
    }

    /// Foto aufnehmen: hochladen und als Notiz mit Bild-URL speichern
    pub fn attach_photo(&self, project: &str, bytes: &[u8]) -> AppResult<Entry> {
        let at = now_local();
        self.attach_media(project, bytes, &capture_filename(at, "jpg"), at)
    }

    /// Sprachaufnahme speichern: hochladen und als Notiz mit Audio-URL speichern
    pub fn attach_voice_memo(&self, project: &str, bytes: &[u8]) -> AppResult<Entry> {
        let at = now_local();
        self.attach_media(project, bytes, &capture_filename(at, "wav"), at)
    }

    /// Hochgeladene Datei anhängen; Bild oder Audio je nach Dateiendung
    pub fn attach_file(&self, project: &str, bytes: &[u8], filename: &str) -> AppResult<Entry> {
        self.attach_media(project, bytes, filename, now_local())
    }

    /// Erst hochladen, dann Eintrag anlegen; scheitert der Eintrag, wird der
    /// Blob wieder entfernt.
    fn attach_media(
        &self,
        project: &str,
        bytes: &[u8],
        filename: &str,
        at: NaiveDateTime,
    ) -> AppResult<Entry> {
        let kind = MediaKind::from_filename(filename);
        let caption = match kind {
            MediaKind::Image => photo_caption(at),
            MediaKind::Audio => voice_memo_caption(at),
            MediaKind::Other => {
                return Err(AppError::validation(format!(
                    "Dateityp von '{}' wird nicht unterstützt",
                    filename
                )))
            }
        };

        let stored = self.media.upload(bytes, filename)?;
        let mut entry = NewEntry::new(caption, EntryCategory::Notiz, project);
        if kind == MediaKind::Image {
            entry.image_url = Some(stored.url.clone());
        } else {
            entry.audio_url = Some(stored.url.clone());
        }

        let id = match self.create_entry(entry) {
            Ok(id) => id,
            Err(e) => {
                if let Err(cleanup) = self.media.remove(&stored.name) {
                    tracing::warn!("Verwaister Upload {} bleibt liegen: {}", stored.name, cleanup);
                }
                return Err(e);
            }
        };

        self.entry(id)?
            .ok_or_else(|| AppError::not_found(format!("Eintrag {}", id)))
    }

    /// Objekte im Bucket ohne verweisenden Eintrag, abgeglichen über den Objektnamen
    pub fn find_orphaned_media(&self) -> AppResult<Vec<StoredMedia>> {
        let referenced: HashSet<String> = self.db.entries().referenced_media_urls()?;
        self.media.orphans(&referenced)
    }

    /// Verwaiste Objekte löschen, gibt die Anzahl zurück
    pub fn purge_orphaned_media(&self) -> AppResult<usize> {
        let orphans = self.find_orphaned_media()?;
        for object in &orphans {
            self.media.remove(&object.name)?;
        }
        if !orphans.is_empty() {
            tracing::info!("{} verwaiste Medien entfernt", orphans.len());
        }
        Ok(orphans.len())
    }

    // --- Material ---

    pub fn create_material(&self, mut material: Material) -> AppResult<Material> {
        self.db.materials().create(&mut material)?;
        Ok(material)
    }

    pub fn list_materials(&self) -> AppResult<Vec<Material>> {
        self.db.materials().find_all()
    }

    /// Inventurkorrektur: Bestand direkt setzen
    pub fn correct_stock(&self, material_id: i64, stock_quantity: f64) -> AppResult<()> {
        self.db.materials().set_stock(material_id, stock_quantity)?;
        tracing::info!("Bestand von Material {} auf {} gesetzt", material_id, stock_quantity);
        Ok(())
    }

    pub fn low_stock_materials(&self) -> AppResult<Vec<Material>> {
        self.db.materials().find_low_stock()
    }

    pub fn book_material_consumption(
        &self,
        material: &str,
        project: &str,
        quantity: f64,
    ) -> AppResult<ConsumptionBooking> {
        self.bookings().book_material_consumption(material, project, quantity)
    }

    // --- Personal ---

    pub fn create_staff(&self, mut staff: Staff) -> AppResult<Staff> {
        self.db.staff().create(&mut staff)?;
        Ok(staff)
    }

    pub fn list_staff(&self) -> AppResult<Vec<Staff>> {
        self.db.staff().find_all()
    }

    pub fn book_staff_time(
        &self,
        staff: &str,
        project: &str,
        hours: f64,
        description: Option<&str>,
    ) -> AppResult<TimeBooking> {
        self.bookings().book_staff_time(staff, project, hours, description)
    }

    pub fn list_work_hours(&self, project: &str) -> AppResult<Vec<WorkHours>> {
        self.db.staff().work_hours_for_project(project)
    }

    pub fn hours_by_worker(&self, project: &str) -> AppResult<Vec<(String, f64)>> {
        self.db.staff().hours_by_worker(project)
    }

    // --- Auswertung ---

    /// Summe aller Kosten der Baustelle, offen und erledigt
    pub fn aggregate_costs(&self, project: &str) -> AppResult<f64> {
        Ok(total_cost(&self.db.entries().cost_amounts(project)?))
    }

    pub fn aggregate_by_category(&self, project: &str) -> AppResult<Vec<(EntryCategory, f64)>> {
        Ok(costs_by_category(&self.db.entries().cost_amounts(project)?))
    }

    pub fn dashboard(&self, project: &str) -> AppResult<DashboardSummary> {
        DashboardSummary::load(&self.db, project)
    }

    fn reports(&self) -> ReportService<'_> {
        ReportService::new(&self.db).with_currency(&self.settings.currency)
    }

    /// PDF-Bericht der Baustelle
    pub fn export_report(&self, project: &str) -> AppResult<Vec<u8>> {
        let report = self.reports().build(project)?;
        render_pdf(&report)
    }

    pub fn export(&self, project: &str, format: ExportFormat) -> AppResult<Vec<u8>> {
        self.reports().render(project, format)
    }

    /// Status eines Eintrags setzen
    pub fn set_status(&self, id: i64, status: EntryStatus) -> AppResult<()> {
        self.update_entry(
            id,
            EntryUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
    }
}
