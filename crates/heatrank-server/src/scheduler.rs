//! Background collection: the cron job plus the one-off startup run.

use std::sync::Arc;

use chrono::FixedOffset;
use heatrank_pipeline::{run_collection_cycle, CycleContext};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Runs collection cycles, at most one at a time.
#[derive(Clone)]
pub struct CycleRunner {
    ctx: Arc<CycleContext>,
    running: Arc<Mutex<()>>,
}

impl CycleRunner {
    pub fn new(ctx: Arc<CycleContext>) -> Self {
        Self {
            ctx,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Run one cycle unless another is still in flight.
    pub async fn run(&self, trigger: &'static str) {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!(trigger, "scheduler: previous cycle still running; skipping");
            return;
        };
        tracing::info!(trigger, "scheduler: starting collection cycle");
        let report = run_collection_cycle(&self.ctx).await;
        tracing::info!(
            trigger,
            tier = report.tier.as_str(),
            qualified = report.qualified,
            persisted = report.persisted,
            persist_failures = report.persist_failures,
            "scheduler: collection cycle complete"
        );
    }
}

/// Fixed UTC offset for the cron schedule, `None` outside ±23 hours.
pub fn schedule_offset(hours: i32) -> Option<FixedOffset> {
    if hours.abs() > 23 {
        return None;
    }
    FixedOffset::east_opt(hours * 3600)
}

/// Builds and starts the scheduler with the daily collection job.
///
/// The returned handle must be kept alive for the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot start.
pub async fn build_scheduler(
    runner: CycleRunner,
    schedule: &str,
    offset: FixedOffset,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async_tz(schedule, offset, move |_uuid, _lock| {
        let runner = runner.clone();
        Box::pin(async move {
            runner.run("cron").await;
        })
    })?;
    scheduler.add(job).await?;
    tracing::info!(schedule, offset = %offset, "scheduler: registered collection job");

    scheduler.start().await?;
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_accepts_taipei_and_rejects_nonsense() {
        assert_eq!(schedule_offset(8).map(|o| o.local_minus_utc()), Some(8 * 3600));
        assert_eq!(schedule_offset(-5).map(|o| o.local_minus_utc()), Some(-5 * 3600));
        assert!(schedule_offset(30).is_none());
    }
}
