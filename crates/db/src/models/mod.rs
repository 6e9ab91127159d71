//! Row models and insert DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO used by the ingestion pipeline
//! - A filter struct used by the listing queries

pub mod alert;
pub mod reading;
