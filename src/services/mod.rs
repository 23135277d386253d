//! Dienste für WerkOS
//!
//! Fachlogik oberhalb der Repositories: Buchungen, Medien, Berichte und die
//! Fassade `EntryStore`.

pub mod booking;
pub mod dashboard;
pub mod media;
pub mod report;
pub mod store;

pub use booking::{BookingService, ConsumptionBooking, TimeBooking};
pub use dashboard::DashboardSummary;
pub use media::{MediaKind, MediaStore, StoredMedia};
pub use report::{ExportFormat, ExportResult, ProjectReport, ReportService};
pub use store::EntryStore;
