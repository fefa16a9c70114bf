use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use heatrank_db::TrendRow;
use heatrank_scoring::{trend_percentage, TrendDirection};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendingQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendingItem {
    title: String,
    current_score: f64,
    previous_score: f64,
    change: f64,
    change_percent: i64,
    direction: TrendDirection,
}

impl From<TrendRow> for TrendingItem {
    fn from(row: TrendRow) -> Self {
        let change = row.change();
        Self {
            change_percent: trend_percentage(row.current_score, row.previous_score),
            direction: TrendDirection::from_change(change),
            change: (change * 10.0).round() / 10.0,
            current_score: row.current_score,
            previous_score: row.previous_score,
            title: row.title,
        }
    }
}

/// Day-over-day heat movers, largest gain first.
pub(super) async fn list_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<TrendingItem>>>, ApiError> {
    let rows = state
        .store
        .trending(Utc::now(), normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(TrendingItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
