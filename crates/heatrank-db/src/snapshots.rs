//! Database operations for the `heat_snapshots` table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use heatrank_core::{ClassificationSource, HeatSnapshot, Platform, RawMetrics};
use serde_json::Value;
use sqlx::PgPool;

use crate::store::{TitleAggregate, TrendRow};
use crate::DbError;

const SNAPSHOT_COLUMNS: &str = "id, title, captured_at, global_score, local_market_score, \
     region_scores, top_regions, reliability, canonical_players, estimated_players, \
     spectators, content_views, discussion_volume, primary_platform, source, confidence";

/// A row from the `heat_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub title: String,
    pub captured_at: DateTime<Utc>,
    pub global_score: i16,
    pub local_market_score: i16,
    pub region_scores: Value,
    pub top_regions: Value,
    pub reliability: f64,
    pub canonical_players: i64,
    pub estimated_players: i64,
    pub spectators: i64,
    pub content_views: i64,
    pub discussion_volume: i64,
    pub primary_platform: String,
    pub source: String,
    pub confidence: i16,
}

pub(crate) fn score_from_db(value: i16) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(0)
}

pub(crate) fn count_from_db(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn count_to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn decode_platform(title: &str, raw: &str) -> Result<Platform, DbError> {
    serde_json::from_value(Value::String(raw.to_owned())).map_err(|_| DbError::Decode {
        title: title.to_owned(),
        reason: format!("unknown platform '{raw}'"),
    })
}

pub(crate) fn decode_source(title: &str, raw: &str) -> Result<ClassificationSource, DbError> {
    ClassificationSource::parse(raw).ok_or_else(|| DbError::Decode {
        title: title.to_owned(),
        reason: format!("unknown classification source '{raw}'"),
    })
}

impl SnapshotRow {
    /// Convert into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] for an unknown platform or source, or
    /// [`DbError::Json`] if a JSONB column has the wrong shape.
    pub fn into_snapshot(self) -> Result<HeatSnapshot, DbError> {
        let primary_platform = decode_platform(&self.title, &self.primary_platform)?;
        let source = decode_source(&self.title, &self.source)?;
        let region_scores: BTreeMap<String, u8> = serde_json::from_value(self.region_scores)?;
        let top_regions: Vec<String> = serde_json::from_value(self.top_regions)?;
        Ok(HeatSnapshot {
            title: self.title,
            captured_at: self.captured_at,
            global_score: score_from_db(self.global_score),
            region_scores,
            top_regions,
            local_market_score: score_from_db(self.local_market_score),
            reliability: self.reliability,
            metrics: RawMetrics {
                canonical_players: count_from_db(self.canonical_players),
                estimated_players: count_from_db(self.estimated_players),
                spectators: count_from_db(self.spectators),
                content_views: count_from_db(self.content_views),
                discussion_volume: count_from_db(self.discussion_volume),
            },
            primary_platform,
            source,
            confidence: score_from_db(self.confidence),
        })
    }
}

/// Insert a snapshot unless a newer one already exists for the same title.
///
/// Returns the generated id.
///
/// # Errors
///
/// Returns [`DbError::OutOfOrder`] if a later snapshot is stored for the
/// title, or [`DbError::Sqlx`] if the insert fails.
pub async fn insert_snapshot(pool: &PgPool, snapshot: &HeatSnapshot) -> Result<i64, DbError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO heat_snapshots \
             (title, captured_at, global_score, local_market_score, region_scores, top_regions, \
              reliability, canonical_players, estimated_players, spectators, content_views, \
              discussion_volume, primary_platform, source, confidence) \
         SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15 \
         WHERE NOT EXISTS ( \
             SELECT 1 FROM heat_snapshots WHERE title = $1 AND captured_at > $2 \
         ) \
         RETURNING id",
    )
    .bind(&snapshot.title)
    .bind(snapshot.captured_at)
    .bind(i16::from(snapshot.global_score))
    .bind(i16::from(snapshot.local_market_score))
    .bind(serde_json::to_value(&snapshot.region_scores)?)
    .bind(serde_json::to_value(&snapshot.top_regions)?)
    .bind(snapshot.reliability)
    .bind(count_to_db(snapshot.metrics.canonical_players))
    .bind(count_to_db(snapshot.metrics.estimated_players))
    .bind(count_to_db(snapshot.metrics.spectators))
    .bind(count_to_db(snapshot.metrics.content_views))
    .bind(count_to_db(snapshot.metrics.discussion_volume))
    .bind(snapshot.primary_platform.as_str())
    .bind(snapshot.source.as_str())
    .bind(i16::from(snapshot.confidence))
    .fetch_optional(pool)
    .await?;

    match id {
        Some(id) => Ok(id),
        None => {
            let latest: Option<DateTime<Utc>> = sqlx::query_scalar(
                "SELECT MAX(captured_at) FROM heat_snapshots WHERE title = $1",
            )
            .bind(&snapshot.title)
            .fetch_one(pool)
            .await?;
            Err(DbError::OutOfOrder {
                title: snapshot.title.clone(),
                latest: latest.unwrap_or(snapshot.captured_at),
                attempted: snapshot.captured_at,
            })
        }
    }
}

/// Most recent snapshot for `title`, or `None` if none exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_snapshot(
    pool: &PgPool,
    title: &str,
) -> Result<Option<SnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM heat_snapshots \
         WHERE title = $1 \
         ORDER BY captured_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(title)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Snapshots for `title` captured in `[from, to]`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots_between(
    pool: &PgPool,
    title: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<SnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM heat_snapshots \
         WHERE title = $1 AND captured_at BETWEEN $2 AND $3 \
         ORDER BY captured_at ASC, id ASC"
    ))
    .bind(title)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The `limit` most recent snapshots for `title`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_snapshots(
    pool: &PgPool,
    title: &str,
    limit: i64,
) -> Result<Vec<SnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM heat_snapshots \
         WHERE title = $1 \
         ORDER BY captured_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(title)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(Debug, sqlx::FromRow)]
struct AggregateRow {
    title: String,
    avg_global_score: f64,
    avg_local_score: f64,
    max_canonical_players: i64,
    max_estimated_players: i64,
    max_spectators: i64,
    data_points: i64,
    last_update: DateTime<Utc>,
    primary_platform: String,
    top_regions: Value,
    region_scores: Value,
    source: String,
    confidence: i16,
}

impl AggregateRow {
    fn into_aggregate(self) -> Result<TitleAggregate, DbError> {
        Ok(TitleAggregate {
            primary_platform: decode_platform(&self.title, &self.primary_platform)?,
            source: decode_source(&self.title, &self.source)?,
            top_regions: serde_json::from_value(self.top_regions)?,
            region_scores: serde_json::from_value(self.region_scores)?,
            avg_global_score: self.avg_global_score,
            avg_local_score: self.avg_local_score,
            max_canonical_players: count_from_db(self.max_canonical_players),
            max_estimated_players: count_from_db(self.max_estimated_players),
            max_spectators: count_from_db(self.max_spectators),
            data_points: count_from_db(self.data_points),
            last_update: self.last_update,
            confidence: score_from_db(self.confidence),
            title: self.title,
        })
    }
}

/// Which average a title aggregate list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOrder {
    Global,
    Local,
}

/// Per-title aggregates over snapshots captured after `since`.
///
/// Averages and peaks cover the whole window; platform, regions, source and
/// confidence come from each title's latest snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or a decode error for a
/// malformed row.
pub async fn list_title_aggregates(
    pool: &PgPool,
    since: DateTime<Utc>,
    order: AggregateOrder,
    limit: i64,
) -> Result<Vec<TitleAggregate>, DbError> {
    let order_by = match order {
        AggregateOrder::Global => "a.avg_global_score DESC",
        AggregateOrder::Local => "a.avg_local_score DESC",
    };
    let rows = sqlx::query_as::<_, AggregateRow>(&format!(
        "WITH recent AS ( \
             SELECT * FROM heat_snapshots WHERE captured_at > $1 \
         ), agg AS ( \
             SELECT title, \
                    AVG(global_score)::float8 AS avg_global_score, \
                    AVG(local_market_score)::float8 AS avg_local_score, \
                    MAX(canonical_players) AS max_canonical_players, \
                    MAX(estimated_players) AS max_estimated_players, \
                    MAX(spectators) AS max_spectators, \
                    COUNT(*) AS data_points, \
                    MAX(captured_at) AS last_update \
             FROM recent GROUP BY title \
         ), latest AS ( \
             SELECT DISTINCT ON (title) title, primary_platform, top_regions, region_scores, \
                    source, confidence \
             FROM recent ORDER BY title, captured_at DESC, id DESC \
         ) \
         SELECT a.title, a.avg_global_score, a.avg_local_score, a.max_canonical_players, \
                a.max_estimated_players, a.max_spectators, a.data_points, a.last_update, \
                l.primary_platform, l.top_regions, l.region_scores, l.source, l.confidence \
         FROM agg a JOIN latest l ON l.title = a.title \
         ORDER BY {order_by}, a.title \
         LIMIT $2"
    ))
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AggregateRow::into_aggregate).collect()
}

/// Titles with a heat average in both the last 24 hours before `now` and the
/// 24 hours before that, largest gain first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trending(
    pool: &PgPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<TrendRow>, DbError> {
    let rows: Vec<(String, f64, f64)> = sqlx::query_as(
        "WITH cur AS ( \
             SELECT title, AVG(global_score)::float8 AS current_score \
             FROM heat_snapshots \
             WHERE captured_at > $1 - INTERVAL '24 hours' AND captured_at <= $1 \
             GROUP BY title \
         ), prev AS ( \
             SELECT title, AVG(global_score)::float8 AS previous_score \
             FROM heat_snapshots \
             WHERE captured_at > $1 - INTERVAL '48 hours' \
               AND captured_at <= $1 - INTERVAL '24 hours' \
             GROUP BY title \
         ) \
         SELECT cur.title, cur.current_score, prev.previous_score \
         FROM cur JOIN prev ON prev.title = cur.title \
         WHERE cur.current_score > 0 AND prev.previous_score > 0 \
         ORDER BY (cur.current_score - prev.previous_score) DESC, cur.title \
         LIMIT $2",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(title, current_score, previous_score)| TrendRow {
            title,
            current_score,
            previous_score,
        })
        .collect())
}
