//! The Trend Store: append-only heat snapshots plus the read queries the
//! API and CLI need.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heatrank_core::{ClassificationSource, HeatSnapshot, Platform};
use serde::Serialize;
use sqlx::PgPool;

use crate::snapshots::{
    get_latest_snapshot, insert_snapshot, list_recent_snapshots, list_snapshots_between,
    list_title_aggregates, list_trending, AggregateOrder, SnapshotRow,
};
use crate::DbError;

/// One title's snapshots over a window, rolled up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleAggregate {
    pub title: String,
    pub avg_global_score: f64,
    pub avg_local_score: f64,
    pub max_canonical_players: u64,
    pub max_estimated_players: u64,
    pub max_spectators: u64,
    pub data_points: u64,
    pub last_update: DateTime<Utc>,
    pub primary_platform: Platform,
    pub top_regions: Vec<String>,
    pub region_scores: BTreeMap<String, u8>,
    pub source: ClassificationSource,
    pub confidence: u8,
}

/// Average heat in the last 24 hours against the 24 hours before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub title: String,
    pub current_score: f64,
    pub previous_score: f64,
}

impl TrendRow {
    #[must_use]
    pub fn change(&self) -> f64 {
        self.current_score - self.previous_score
    }
}

#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Append one snapshot.
    ///
    /// # Errors
    ///
    /// [`DbError::OutOfOrder`] when a later snapshot exists for the title;
    /// backend errors otherwise.
    async fn append(&self, snapshot: &HeatSnapshot) -> Result<(), DbError>;

    /// Most recent snapshot for `title`.
    async fn latest(&self, title: &str) -> Result<Option<HeatSnapshot>, DbError>;

    /// Snapshots for `title` captured in `[from, to]`, oldest first.
    async fn windowed(
        &self,
        title: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HeatSnapshot>, DbError>;

    /// Titles seen after `since`, by average global heat, highest first.
    async fn top_by_score(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError>;

    /// Titles seen after `since`, by average local-market score, highest first.
    async fn local_ranking(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError>;

    /// The `limit` most recent snapshots for `title`, newest first.
    async fn history(&self, title: &str, limit: usize) -> Result<Vec<HeatSnapshot>, DbError>;

    /// Day-over-day movers as of `now`, largest gain first.
    async fn trending(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<TrendRow>, DbError>;
}

fn limit_to_db(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn decode_all(rows: Vec<SnapshotRow>) -> Result<Vec<HeatSnapshot>, DbError> {
    rows.into_iter().map(SnapshotRow::into_snapshot).collect()
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TrendStore for PgTrendStore {
    async fn append(&self, snapshot: &HeatSnapshot) -> Result<(), DbError> {
        let id = insert_snapshot(&self.pool, snapshot).await?;
        tracing::debug!(title = %snapshot.title, id, "heat snapshot stored");
        Ok(())
    }

    async fn latest(&self, title: &str) -> Result<Option<HeatSnapshot>, DbError> {
        get_latest_snapshot(&self.pool, title)
            .await?
            .map(SnapshotRow::into_snapshot)
            .transpose()
    }

    async fn windowed(
        &self,
        title: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HeatSnapshot>, DbError> {
        decode_all(list_snapshots_between(&self.pool, title, from, to).await?)
    }

    async fn top_by_score(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        list_title_aggregates(&self.pool, since, AggregateOrder::Global, limit_to_db(limit)).await
    }

    async fn local_ranking(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        list_title_aggregates(&self.pool, since, AggregateOrder::Local, limit_to_db(limit)).await
    }

    async fn history(&self, title: &str, limit: usize) -> Result<Vec<HeatSnapshot>, DbError> {
        decode_all(list_recent_snapshots(&self.pool, title, limit_to_db(limit)).await?)
    }

    async fn trending(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<TrendRow>, DbError> {
        list_trending(&self.pool, now, limit_to_db(limit)).await
    }
}
