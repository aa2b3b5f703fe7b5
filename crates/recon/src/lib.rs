//! `fieldaudit-recon` — field-visit audit engine.
//!
//! Pure engine crate: normalizes route-log and roster CSV text into canonical
//! records, reconciles the two sets into compliance metrics and fraud alerts.
//! No CLI or file IO; storage sits behind the [`store::RecordStore`] trait.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod header;
pub mod insights;
pub mod model;
pub mod normalize;
pub mod store;

pub use config::AuditConfig;
pub use engine::reconcile;
pub use error::ReconError;
pub use model::{AlertKind, FraudAlert, Metrics, RecordKind, RosterEntry, RouteVisitRecord};
pub use normalize::{normalize, normalize_with, NormalizeOptions, NormalizeOutput};
