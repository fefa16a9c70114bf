//! In-process Trend Store for dry runs and tests.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use heatrank_core::HeatSnapshot;

use crate::snapshots::AggregateOrder;
use crate::store::{TitleAggregate, TrendRow, TrendStore};
use crate::DbError;

/// Vec-backed store with the same ordering rules as [`crate::PgTrendStore`].
#[derive(Debug, Default)]
pub struct MemoryTrendStore {
    rows: RwLock<Vec<HeatSnapshot>>,
}

impl MemoryTrendStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored snapshot in insertion order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<HeatSnapshot> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn aggregate(
        &self,
        since: DateTime<Utc>,
        order: AggregateOrder,
        limit: usize,
    ) -> Vec<TitleAggregate> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut by_title: BTreeMap<&str, Vec<&HeatSnapshot>> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.captured_at > since) {
            by_title.entry(row.title.as_str()).or_default().push(row);
        }

        let mut aggregates: Vec<TitleAggregate> = by_title
            .into_iter()
            .filter_map(|(title, group)| summarize_group(title, &group))
            .collect();
        aggregates.sort_by(|a, b| {
            let (ka, kb) = match order {
                AggregateOrder::Global => (a.avg_global_score, b.avg_global_score),
                AggregateOrder::Local => (a.avg_local_score, b.avg_local_score),
            };
            kb.total_cmp(&ka).then_with(|| a.title.cmp(&b.title))
        });
        aggregates.truncate(limit);
        aggregates
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize_group(title: &str, group: &[&HeatSnapshot]) -> Option<TitleAggregate> {
    // the last maximum is the most recently appended snapshot
    let latest = group.iter().max_by_key(|s| s.captured_at)?;
    let n = group.len() as f64;
    let avg = |f: fn(&HeatSnapshot) -> u8| group.iter().map(|s| f64::from(f(s))).sum::<f64>() / n;
    let peak = |f: fn(&HeatSnapshot) -> u64| group.iter().map(|s| f(s)).max().unwrap_or(0);
    Some(TitleAggregate {
        title: title.to_owned(),
        avg_global_score: avg(|s| s.global_score),
        avg_local_score: avg(|s| s.local_market_score),
        max_canonical_players: peak(|s| s.metrics.canonical_players),
        max_estimated_players: peak(|s| s.metrics.estimated_players),
        max_spectators: peak(|s| s.metrics.spectators),
        data_points: group.len() as u64,
        last_update: latest.captured_at,
        primary_platform: latest.primary_platform,
        top_regions: latest.top_regions.clone(),
        region_scores: latest.region_scores.clone(),
        source: latest.source,
        confidence: latest.confidence,
    })
}

#[allow(clippy::cast_precision_loss)]
fn average_between(
    rows: &[HeatSnapshot],
    title: &str,
    after: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Option<f64> {
    let scores: Vec<f64> = rows
        .iter()
        .filter(|r| r.title == title && r.captured_at > after && r.captured_at <= until)
        .map(|r| f64::from(r.global_score))
        .collect();
    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
}

#[async_trait]
impl TrendStore for MemoryTrendStore {
    async fn append(&self, snapshot: &HeatSnapshot) -> Result<(), DbError> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let latest = rows
            .iter()
            .filter(|r| r.title == snapshot.title)
            .map(|r| r.captured_at)
            .max();
        if let Some(latest) = latest.filter(|l| *l > snapshot.captured_at) {
            return Err(DbError::OutOfOrder {
                title: snapshot.title.clone(),
                latest,
                attempted: snapshot.captured_at,
            });
        }
        rows.push(snapshot.clone());
        Ok(())
    }

    async fn latest(&self, title: &str) -> Result<Option<HeatSnapshot>, DbError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows
            .iter()
            .filter(|r| r.title == title)
            .max_by_key(|r| r.captured_at)
            .cloned())
    }

    async fn windowed(
        &self,
        title: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HeatSnapshot>, DbError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut window: Vec<HeatSnapshot> = rows
            .iter()
            .filter(|r| r.title == title && r.captured_at >= from && r.captured_at <= to)
            .cloned()
            .collect();
        window.sort_by_key(|r| r.captured_at);
        Ok(window)
    }

    async fn top_by_score(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        Ok(self.aggregate(since, AggregateOrder::Global, limit))
    }

    async fn local_ranking(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        Ok(self.aggregate(since, AggregateOrder::Local, limit))
    }

    async fn history(&self, title: &str, limit: usize) -> Result<Vec<HeatSnapshot>, DbError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut recent: Vec<HeatSnapshot> = rows
            .iter()
            .rev()
            .filter(|r| r.title == title)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn trending(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<TrendRow>, DbError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let day_ago = now - Duration::hours(24);
        let two_days_ago = now - Duration::hours(48);

        let mut titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        titles.sort_unstable();
        titles.dedup();

        let mut trending: Vec<TrendRow> = titles
            .into_iter()
            .filter_map(|title| {
                let current = average_between(&rows, title, day_ago, now)?;
                let previous = average_between(&rows, title, two_days_ago, day_ago)?;
                (current > 0.0 && previous > 0.0).then(|| TrendRow {
                    title: title.to_owned(),
                    current_score: current,
                    previous_score: previous,
                })
            })
            .collect();
        trending.sort_by(|a, b| {
            b.change()
                .total_cmp(&a.change())
                .then_with(|| a.title.cmp(&b.title))
        });
        trending.truncate(limit);
        Ok(trending)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
