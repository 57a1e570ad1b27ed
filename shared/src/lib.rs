//! Shared types and models for the AudiCare Clinic Management Platform
//!
//! This crate contains the domain models, common types, validation helpers,
//! and the derived-stock reconciliation engine shared between the backend
//! and other components of the system. It performs no I/O.

pub mod models;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
