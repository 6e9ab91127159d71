//! Domain logic shared by the ingestion pipeline and the read API.
//!
//! Everything in this crate is pure: no database access, no network I/O.
//! The caller decodes, evaluates and synthesizes here, then persists
//! through `gridwatch-db`.

pub mod alert;
pub mod error;
pub mod pagination;
pub mod parameters;
pub mod payload;
pub mod thresholds;
pub mod types;
