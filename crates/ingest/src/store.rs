//! Persistence seam for the ingestion loop.
//!
//! The loop only needs two write operations. [`RecordStore`] narrows the
//! repositories down to those so tests can inject failures without a
//! database.

use async_trait::async_trait;
use gridwatch_core::types::DbId;
use gridwatch_db::models::alert::CreateAlert;
use gridwatch_db::models::reading::CreateSensorReading;
use gridwatch_db::repositories::{AlertRepo, ReadingRepo};
use gridwatch_db::DbPool;

/// Errors raised by a [`RecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Write side of the reading and alert tables.
///
/// Each call is its own unit of work: a stored reading is never rolled back
/// because a later alert insert fails.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a reading and return its server-assigned id.
    async fn insert_reading(&self, reading: &CreateSensorReading) -> Result<DbId, StoreError>;

    /// Persist an alert and return its server-assigned id.
    async fn insert_alert(&self, alert: &CreateAlert) -> Result<DbId, StoreError>;
}

/// [`RecordStore`] backed by the Postgres pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_reading(&self, reading: &CreateSensorReading) -> Result<DbId, StoreError> {
        let row = ReadingRepo::insert(&self.pool, reading).await?;
        Ok(row.id)
    }

    async fn insert_alert(&self, alert: &CreateAlert) -> Result<DbId, StoreError> {
        let row = AlertRepo::insert(&self.pool, alert).await?;
        Ok(row.id)
    }
}
