//! `collect` and `classify`: commands that drive the pipeline directly.

use std::sync::Arc;

use heatrank_core::{AppConfig, Candidate};
use heatrank_db::{MemoryTrendStore, PgTrendStore, TrendStore};
use heatrank_pipeline::{
    build_chain, load_registry, run_collection_cycle, CycleConfig, CycleContext, CycleReport,
};
use heatrank_scoring::{MetricEstimator, RandomEstimator};

/// Run one cycle. `dry_run` keeps snapshots in memory and needs no database.
///
/// # Errors
///
/// Returns an error if the registry, the HTTP clients or the database
/// connection cannot be set up.
pub(crate) async fn run_collect(
    config: &AppConfig,
    dry_run: bool,
    count: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let store: Arc<dyn TrendStore> = if dry_run {
        Arc::new(MemoryTrendStore::new())
    } else {
        let pool = heatrank_db::connect_pool_from_config(config).await?;
        heatrank_db::run_migrations(&pool).await?;
        Arc::new(PgTrendStore::new(pool))
    };

    let mut ctx = CycleContext::build(
        config,
        load_registry(config)?,
        store,
        Arc::new(RandomEstimator) as Arc<dyn MetricEstimator>,
    )?;
    if let Some(count) = count {
        ctx.config.discovery_count = count.max(1);
    }

    let report = run_collection_cycle(&ctx).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dry_run);
    }
    Ok(())
}

fn print_report(report: &CycleReport, dry_run: bool) {
    println!(
        "tier: {}  discovered: {}  excluded: {}  qualified: {}{}",
        report.tier.as_str(),
        report.discovered,
        report.excluded,
        report.qualified,
        if report.used_static_fallback {
            "  (curated fallback)"
        } else {
            ""
        }
    );
    println!(
        "{:<5}{:<36}{:<7}{:<7}{:<12}{:<12}{:<17}CONF",
        "RANK", "TITLE", "HEAT", "LOCAL", "PLAYERS", "VIEWERS", "SOURCE"
    );
    for r in &report.ranking {
        println!(
            "{:<5}{:<36}{:<7}{:<7}{:<12}{:<12}{:<17}{}",
            r.rank,
            r.title,
            r.global_score,
            r.local_market_score,
            r.estimated_players,
            r.spectators,
            r.source.as_str(),
            r.confidence
        );
    }
    if !report.rejections.is_empty() {
        println!();
        println!("rejected:");
        for r in &report.rejections {
            println!("  {} ({} {}): {}", r.title, r.source.as_str(), r.confidence, r.reason);
        }
    }
    if dry_run {
        println!("dry-run: nothing was written to the database");
    } else if report.persist_failures > 0 {
        eprintln!(
            "warning: {} of {} snapshots failed to persist",
            report.persist_failures,
            report.ranking.len()
        );
    }
}

/// Classify one title and print the verdict with every stage attempt.
///
/// # Errors
///
/// Returns an error if the registry or a classifier backend cannot be built.
pub(crate) async fn run_classify(
    config: &AppConfig,
    name: &str,
    viewers: u64,
    json: bool,
) -> anyhow::Result<()> {
    let cycle = CycleConfig::from_app_config(config);
    let chain = build_chain(config, &cycle, load_registry(config)?)?;
    let outcome = chain.classify(&Candidate::new(name, viewers)).await;

    if json {
        let value = serde_json::json!({
            "name": outcome.name,
            "qualifies": outcome.verdict.qualifies,
            "source": outcome.verdict.source,
            "confidence": outcome.verdict.confidence,
            "sub_genre": outcome.verdict.sub_genre,
            "reason": outcome.verdict.reason,
            "weighted_avg": outcome.verdict.weighted_avg,
            "qualifying_count": outcome.verdict.qualifying_count,
            "profile": outcome.profile,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{}: {} by {} at {}%",
        outcome.name,
        if outcome.qualifies() { "qualifies" } else { "rejected" },
        outcome.verdict.source.as_str(),
        outcome.verdict.confidence
    );
    println!("reason: {}", outcome.verdict.reason);
    if let Some(sub_genre) = &outcome.verdict.sub_genre {
        println!("sub-genre: {sub_genre}");
    }
    for d in &outcome.verdict.dimensions {
        println!(
            "  {:<12}{:>4}  {}",
            d.dimension.as_str(),
            d.score,
            if d.qualifies { "qualifies" } else { "-" }
        );
    }
    for attempt in &outcome.attempts {
        match &attempt.failure {
            Some(failure) => println!(
                "  stage {} failed after {} ms: {failure}",
                attempt.stage, attempt.elapsed_ms
            ),
            None => println!("  stage {} answered in {} ms", attempt.stage, attempt.elapsed_ms),
        }
    }
    if let Some(profile) = &outcome.profile {
        println!(
            "primary platform: {}  viewpoint: {}",
            profile.primary_platform, profile.viewpoint
        );
    }
    Ok(())
}
