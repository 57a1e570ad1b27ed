//! Domain models for the AudiCare Clinic Management Platform

mod documents;
mod enquiry;
mod party;
mod product;
mod stock;

pub use documents::*;
pub use enquiry::*;
pub use party::*;
pub use product::*;
pub use stock::*;
