//! Business logic services for the AudiCare Clinic Management Platform

pub mod auth;
pub mod catalog;
pub mod documents;
pub mod enquiry;
pub mod inventory;
pub mod party;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use documents::DocumentService;
pub use enquiry::EnquiryService;
pub use inventory::InventoryService;
pub use party::PartyService;
