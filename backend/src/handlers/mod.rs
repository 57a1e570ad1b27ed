//! HTTP handlers for the AudiCare Clinic Management Platform

pub mod auth;
pub mod documents;
pub mod enquiries;
pub mod health;
pub mod parties;
pub mod products;
pub mod stock;

pub use auth::*;
pub use documents::*;
pub use enquiries::*;
pub use health::*;
pub use parties::*;
pub use products::*;
pub use stock::*;
