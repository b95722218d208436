//! Small relational stores backing the clinic assistant.
//!
//! Three SQLite databases, one per concern, mirroring how the data is
//! owned: clinic operations (appointments + treatments), embryology
//! updates, and the manifest registry. Each store opens a short-lived
//! connection per call and runs its idempotent migration on open, so the
//! handles are cheap to clone and safe to use from blocking sections of
//! async handlers.

mod clinic_db;
mod embryology;
mod errors;
mod registry;

pub use clinic_db::{Appointment, ClinicDb, NewAppointment, NewTreatment, Treatment};
pub use embryology::{EmbryologyDb, EmbryologyUpdate, NewEmbryologyUpdate, render_updates_markdown};
pub use errors::StoreError;
pub use registry::ManifestRegistry;
