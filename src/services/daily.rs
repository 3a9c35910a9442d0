//! Daily card record store and the same-day reuse policy.
//!
//! DESIGN
//! ======
//! `DailyRecordStore` is a plain CRUD wrapper over the `daily_records`
//! table. Dates persist as integer Unix nanoseconds so ordering is numeric
//! and a stored record reads back equal to what was written.
//!
//! `DailyCardService::today` reads the newest record; if it falls on the
//! caller's calendar day it is reused, otherwise a card is drawn, advice is
//! generated, and the new record is stored.

use std::sync::Arc;

use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use crate::deck::{self, Card};
use crate::error::ErrorCode;
use crate::insight::{InsightError, InsightGenerator, InsightRequest};

// =============================================================================
// RECORD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    pub id: Uuid,
    pub date: OffsetDateTime,
    pub card: Card,
    pub advice: String,
}

impl DailyRecord {
    #[must_use]
    pub fn new(date: OffsetDateTime, card: Card, advice: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), date, card, advice: advice.into() }
    }
}

fn to_nanos(date: OffsetDateTime) -> Result<i64, StoreError> {
    i64::try_from(date.unix_timestamp_nanos()).map_err(|_| StoreError::Timestamp(date.to_string()))
}

fn from_nanos(nanos: i64) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).map_err(|e| StoreError::Timestamp(e.to_string()))
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct DailyRecordStore {
    pool: SqlitePool,
}

impl DailyRecordStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace by id. Returns the record unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the date is out of range.
    pub async fn store(&self, record: DailyRecord) -> Result<DailyRecord, StoreError> {
        sqlx::query(
            "INSERT INTO daily_records (id, date, card, advice) VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET date = excluded.date, card = excluded.card, advice = excluded.advice",
        )
        .bind(record.id)
        .bind(to_nanos(record.date)?)
        .bind(record.card.id())
        .bind(&record.advice)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    /// All records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a stored date is invalid.
    pub async fn fetch(&self) -> Result<Vec<DailyRecord>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, i64, String, String)>(
            "SELECT id, date, card, advice FROM daily_records ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, date, card, advice)| Ok(DailyRecord { id, date: from_nanos(date)?, card: Card::new(card), advice }))
            .collect()
    }

    /// Newest record, if any.
    ///
    /// # Errors
    ///
    /// Same as [`DailyRecordStore::fetch`].
    pub async fn latest(&self) -> Result<Option<DailyRecord>, StoreError> {
        Ok(self.fetch().await?.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails. Deleting a missing record is not an error.
    pub async fn delete(&self, record: &DailyRecord) -> Result<(), StoreError> {
        self.delete_id(record.id).await.map(|_| ())
    }

    /// Delete by id, returning whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM daily_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every record, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM daily_records")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// DAILY CARD POLICY
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DailyError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("advice generation failed: {0}")]
    Generation(#[from] InsightError),
}

impl ErrorCode for DailyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Generation(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.retryable(),
            Self::Generation(e) => e.retryable(),
        }
    }
}

/// Whether `today` reused a stored record or made a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyOutcome {
    Cached(DailyRecord),
    Generated(DailyRecord),
}

impl DailyOutcome {
    #[must_use]
    pub fn record(&self) -> &DailyRecord {
        match self {
            Self::Cached(r) | Self::Generated(r) => r,
        }
    }

    #[must_use]
    pub fn into_record(self) -> DailyRecord {
        match self {
            Self::Cached(r) | Self::Generated(r) => r,
        }
    }
}

pub struct DailyCardService {
    store: DailyRecordStore,
    generator: Arc<dyn InsightGenerator>,
}

impl DailyCardService {
    #[must_use]
    pub fn new(store: DailyRecordStore, generator: Arc<dyn InsightGenerator>) -> Self {
        Self { store, generator }
    }

    /// Today's card as seen from `now`'s UTC offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or advice cannot be generated.
    /// Nothing is stored when generation fails.
    pub async fn today(&self, now: OffsetDateTime) -> Result<DailyOutcome, DailyError> {
        if let Some(latest) = self.store.latest().await? {
            if is_same_day(latest.date, now) {
                info!(card = %latest.card, "daily: reusing today's card");
                return Ok(DailyOutcome::Cached(latest));
            }
        }

        let card = deck::draw_one(&mut rand::rng());
        info!(card = %card, "daily: drew new card");
        let advice = self
            .generator
            .generate(&InsightRequest::daily_advice(&card))
            .await?;
        let record = self.store.store(DailyRecord::new(now, card, advice)).await?;
        Ok(DailyOutcome::Generated(record))
    }
}

fn is_same_day(stored: OffsetDateTime, now: OffsetDateTime) -> bool {
    stored.to_offset(now.offset()).date() == now.date()
}

#[cfg(test)]
#[path = "daily_test.rs"]
mod tests;
