use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use heatrank_core::{ClassificationSource, Platform};
use heatrank_db::TitleAggregate;
use heatrank_scoring::{composite_score, rank_descending, summarize, HeatStatus, StatsSummary};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_hours, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct RankingQuery {
    pub limit: Option<usize>,
    pub hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatsQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct GameItem {
    rank: usize,
    title: String,
    heat_score: f64,
    local_score: f64,
    status: HeatStatus,
    status_label: &'static str,
    estimated_players: u64,
    steam_players: u64,
    spectators: u64,
    primary_platform: Platform,
    top_regions: Vec<String>,
    region_scores: BTreeMap<String, u8>,
    source: ClassificationSource,
    confidence: u8,
    data_points: u64,
    last_update: DateTime<Utc>,
    composite_score: f64,
}

impl GameItem {
    fn from_aggregate(row: TitleAggregate) -> Self {
        let status = HeatStatus::from_score(row.avg_global_score);
        Self {
            rank: 0,
            heat_score: round_tenth(row.avg_global_score),
            local_score: round_tenth(row.avg_local_score),
            status,
            status_label: status.label(),
            estimated_players: row.max_estimated_players,
            steam_players: row.max_canonical_players,
            spectators: row.max_spectators,
            primary_platform: row.primary_platform,
            composite_score: composite_score(
                row.max_estimated_players,
                row.confidence,
                row.primary_platform != Platform::Console,
            ),
            top_regions: row.top_regions,
            region_scores: row.region_scores,
            source: row.source,
            confidence: row.confidence,
            data_points: row.data_points,
            last_update: row.last_update,
            title: row.title,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LocalRanking {
    local_region: String,
    games: Vec<GameItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryPoint {
    captured_at: DateTime<Utc>,
    global_score: u8,
    local_market_score: u8,
    estimated_players: u64,
    spectators: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct GameStats {
    title: String,
    hours: i64,
    status: HeatStatus,
    summary: StatsSummary,
    region_scores: BTreeMap<String, u8>,
    history: Vec<HistoryPoint>,
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn assign_ranks(items: &mut [GameItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.rank = i + 1;
    }
}

/// Titles by composite score over the last `hours` (default 24).
pub(super) async fn list_games(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<GameItem>>>, ApiError> {
    let since = Utc::now() - Duration::hours(normalize_hours(query.hours, 24));
    let rows = state
        .store
        .top_by_score(since, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut data: Vec<GameItem> = rows.into_iter().map(GameItem::from_aggregate).collect();
    rank_descending(&mut data, |item| item.composite_score);
    assign_ranks(&mut data);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Titles by average local-market score.
pub(super) async fn local_ranking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<LocalRanking>>, ApiError> {
    let since = Utc::now() - Duration::hours(normalize_hours(query.hours, 24));
    let rows = state
        .store
        .local_ranking(since, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut games: Vec<GameItem> = rows.into_iter().map(GameItem::from_aggregate).collect();
    assign_ranks(&mut games);

    Ok(Json(ApiResponse {
        data: LocalRanking {
            local_region: state.local_region.clone(),
            games,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Summary and history for one title over the last `hours` (default 7 days).
pub(super) async fn game_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<GameStats>>, ApiError> {
    let hours = normalize_hours(query.hours, 24 * 7);
    let to = Utc::now();
    let from = to - Duration::hours(hours);
    let snapshots = state
        .store
        .windowed(&name, from, to)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let Some(latest) = snapshots.last() else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no heat data for {name} in the last {hours} hours"),
        ));
    };

    let summary = summarize(&snapshots);
    let region_scores = latest.region_scores.clone();
    let history = snapshots
        .iter()
        .map(|s| HistoryPoint {
            captured_at: s.captured_at,
            global_score: s.global_score,
            local_market_score: s.local_market_score,
            estimated_players: s.metrics.estimated_players,
            spectators: s.metrics.spectators,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: GameStats {
            title: name,
            hours,
            status: HeatStatus::from_score(f64::from(summary.average_heat)),
            summary,
            region_scores,
            history,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
