//! Database models for the AudiCare Clinic Management Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
