//! Read-only trend queries.

use chrono::{Duration, Utc};
use heatrank_core::AppConfig;
use heatrank_db::{PgTrendStore, TrendStore};
use heatrank_scoring::{trend_percentage, HeatStatus, TrendDirection};

async fn open_store(config: &AppConfig) -> anyhow::Result<PgTrendStore> {
    let pool = heatrank_db::connect_pool_from_config(config).await?;
    Ok(PgTrendStore::new(pool))
}

/// # Errors
///
/// Returns an error if the database cannot be reached or the query fails.
pub(crate) async fn run_ranking(
    config: &AppConfig,
    limit: usize,
    hours: i64,
    local: bool,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let since = Utc::now() - Duration::hours(hours.max(1));
    let rows = if local {
        store.local_ranking(since, limit.max(1)).await?
    } else {
        store.top_by_score(since, limit.max(1)).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no heat data in the last {hours} hours; run `collect` first");
        return Ok(());
    }

    if local {
        println!("local market: {}", config.local_region);
    }
    println!(
        "{:<5}{:<36}{:<8}{:<8}{:<10}{:<12}POINTS",
        "RANK", "TITLE", "HEAT", "LOCAL", "STATUS", "PLAYERS"
    );
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:<5}{:<36}{:<8.1}{:<8.1}{:<10}{:<12}{}",
            i + 1,
            row.title,
            row.avg_global_score,
            row.avg_local_score,
            HeatStatus::from_score(row.avg_global_score).label(),
            row.max_estimated_players,
            row.data_points
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the database cannot be reached or the query fails.
pub(crate) async fn run_trending(
    config: &AppConfig,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let rows = store.trending(Utc::now(), limit.max(1)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("not enough history for day-over-day trends yet");
        return Ok(());
    }

    println!("{:<36}{:<9}{:<9}{:<9}TREND", "TITLE", "NOW", "BEFORE", "CHANGE");
    for row in &rows {
        let direction = match TrendDirection::from_change(row.change()) {
            TrendDirection::Surging => "surging",
            TrendDirection::Rising => "rising",
            TrendDirection::Flat => "flat",
            TrendDirection::Falling => "falling",
            TrendDirection::Plunging => "plunging",
        };
        println!(
            "{:<36}{:<9.1}{:<9.1}{:<9}{}",
            row.title,
            row.current_score,
            row.previous_score,
            format!("{:+}%", trend_percentage(row.current_score, row.previous_score)),
            direction
        );
    }
    Ok(())
}
