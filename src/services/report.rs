//! Projektberichte als PDF, CSV und JSON

use chrono::Local;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use serde::Serialize;
use std::path::Path;

use crate::db::{Database, EntryFilter};
use crate::models::{Entry, EntryCategory, Project};
use crate::services::dashboard::{costs_by_category, total_cost};
use crate::utils::date::date_part;
use crate::utils::error::{AppError, AppResult};

/// Exportformat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportFormat {
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Exportierbarer Eintrag
#[derive(Debug, Clone, Serialize)]
pub struct EntryExport {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub status: String,
    pub content: String,
    pub cost_amount: f64,
    pub is_completed: bool,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
}

impl From<&Entry> for EntryExport {
    fn from(e: &Entry) -> Self {
        Self {
            id: e.id,
            date: e.created_at.as_deref().map(date_part).unwrap_or_default().to_string(),
            category: e.category.to_string(),
            status: e.status.to_string(),
            content: e.content.clone(),
            cost_amount: e.cost_amount,
            is_completed: e.is_completed,
            image_url: e.image_url.clone(),
            audio_url: e.audio_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCost {
    pub category: EntryCategory,
    pub total: f64,
}

/// Gesamter Bericht einer Baustelle
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: String,
    pub generated_at: String,
    pub currency: String,
    pub total_cost: f64,
    pub costs_by_category: Vec<CategoryCost>,
    pub entries: Vec<EntryExport>,
}

impl ProjectReport {
    pub fn from_entries(project: &str, entries: &[Entry], currency: &str) -> Self {
        let amounts: Vec<(EntryCategory, f64)> =
            entries.iter().map(|e| (e.category, e.cost_amount)).collect();

        Self {
            project: Project::normalize_name(project),
            generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            currency: currency.to_string(),
            total_cost: total_cost(&amounts),
            costs_by_category: costs_by_category(&amounts)
                .into_iter()
                .map(|(category, total)| CategoryCost { category, total })
                .collect(),
            entries: entries.iter().map(EntryExport::from).collect(),
        }
    }
}

/// Eine gesetzte Textzeile im PDF
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    /// Grundlinie in mm von unten
    pub y: f32,
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_TOP: f32 = 280.0;
const MARGIN_BOTTOM: f32 = 20.0;
/// Zeichen pro Zeile bei 11pt Helvetica auf 180 mm
const WRAP_WIDTH: usize = 85;

/// Zeichen außerhalb von Latin-1 durch `?` ersetzen
pub fn to_latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c } else { '?' })
        .collect()
}

/// Text an Wortgrenzen umbrechen; überlange Wörter werden hart geteilt
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Bericht auf A4-Seiten verteilen
pub fn layout_report(report: &ProjectReport) -> Vec<Vec<PdfLine>> {
    // (Text, Schriftgröße, fett, Zeilenvorschub danach)
    let mut rows: Vec<(String, f32, bool, f32)> = vec![
        (format!("Projektbericht: {}", report.project), 16.0, true, 10.0),
        (
            format!("Gesamtkosten: {:.2} {}", report.total_cost, report.currency),
            12.0,
            false,
            15.0,
        ),
    ];

    for entry in &report.entries {
        rows.push((
            format!("{} | {} ({})", entry.category, entry.status, entry.date),
            11.0,
            true,
            8.0,
        ));

        let body = format!(
            "{} - Kosten: {:.2} {}",
            entry.content, entry.cost_amount, report.currency
        );
        let wrapped = wrap_text(&body, WRAP_WIDTH);
        let last = wrapped.len() - 1;
        for (i, line) in wrapped.into_iter().enumerate() {
            let advance = if i == last { 12.0 } else { 7.0 };
            rows.push((line, 11.0, false, advance));
        }
    }

    let mut pages = vec![Vec::new()];
    let mut y = MARGIN_TOP;

    for (text, font_size, bold, advance) in rows {
        if y < MARGIN_BOTTOM {
            pages.push(Vec::new());
            y = MARGIN_TOP;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PdfLine {
                text: to_latin1_lossy(&text),
                font_size,
                bold,
                y,
            });
        }
        y -= advance;
    }

    pages
}

/// PDF-Bytes erzeugen
pub fn render_pdf(report: &ProjectReport) -> AppResult<Vec<u8>> {
    let title = to_latin1_lossy(&format!("Projektbericht: {}", report.project));
    let (doc, page1, layer1) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Ebene 1");

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Pdf(e.to_string()))?;

    for (i, lines) in layout_report(report).iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Ebene 1");
            doc.get_page(page).get_layer(layer)
        };
        draw_lines(&layer, lines, &font, &font_bold);
    }

    doc.save_to_bytes().map_err(|e| AppError::Pdf(e.to_string()))
}

fn draw_lines(
    layer: &PdfLayerReference,
    lines: &[PdfLine],
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
) {
    for line in lines {
        let font = if line.bold { font_bold } else { font };
        layer.use_text(line.text.as_str(), line.font_size, Mm(MARGIN_LEFT), Mm(line.y), font);
    }
}

pub fn to_json(report: &ProjectReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn to_csv(report: &ProjectReport) -> String {
    let mut csv = String::from("id,datum,kategorie,status,inhalt,kosten,erledigt\n");
    for e in &report.entries {
        csv.push_str(&format!(
            "{},{},{},{},{},{:.2},{}\n",
            e.id,
            e.date,
            csv_escape(&e.category),
            csv_escape(&e.status),
            csv_escape(&e.content),
            e.cost_amount,
            if e.is_completed { "ja" } else { "nein" }
        ));
    }
    csv
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Ergebnis eines Dateiexports
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub project: String,
    pub format: ExportFormat,
    pub row_count: usize,
    pub file_size: usize,
}

impl ExportResult {
    pub fn summary(&self) -> String {
        format!(
            "{} Einträge von '{}' als {} exportiert ({} Bytes)",
            self.row_count,
            self.project,
            self.format.display_name(),
            self.file_size
        )
    }
}

/// Berichte aus der Datenbank erzeugen
pub struct ReportService<'a> {
    db: &'a Database,
    currency: String,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            currency: "EUR".to_string(),
        }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    /// Alle Einträge der Baustelle, offen und erledigt
    pub fn build(&self, project: &str) -> AppResult<ProjectReport> {
        let entries = self.db.entries().find(&EntryFilter::project(project))?;
        Ok(ProjectReport::from_entries(project, &entries, &self.currency))
    }

    pub fn render(&self, project: &str, format: ExportFormat) -> AppResult<Vec<u8>> {
        let report = self.build(project)?;
        match format {
            ExportFormat::Pdf => render_pdf(&report),
            ExportFormat::Json => Ok(to_json(&report)?.into_bytes()),
            ExportFormat::Csv => Ok(to_csv(&report).into_bytes()),
        }
    }

    /// Dateiname für den Export, z.B. `werkos_neubau_20240115_143005.pdf`
    pub fn generate_filename(project: &str, format: ExportFormat) -> String {
        let slug: String = Project::normalize_name(project)
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("werkos_{}_{}.{}", slug, timestamp, format.extension())
    }

    pub fn export_to_file(
        &self,
        project: &str,
        format: ExportFormat,
        path: &Path,
    ) -> AppResult<ExportResult> {
        let report = self.build(project)?;
        let bytes = match format {
            ExportFormat::Pdf => render_pdf(&report)?,
            ExportFormat::Json => to_json(&report)?.into_bytes(),
            ExportFormat::Csv => to_csv(&report).into_bytes(),
        };

        crate::utils::file_ops::write_bytes(path, &bytes)?;
        tracing::info!("Bericht exportiert: {:?}", path);

        Ok(ExportResult {
            project: report.project,
            format,
            row_count: report.entries.len(),
            file_size: bytes.len(),
        })
    }
}
