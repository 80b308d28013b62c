use crate::dispatcher::{Dispatcher, JobKind};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// Twice daily, 08:00 and 21:00.
pub const DAILY_QUOTE_CRON: &str = "0 0 8,21 * * *";
/// Every six hours, on the hour.
pub const AIRING_CHECK_CRON: &str = "0 0 */6 * * *";
/// Sundays at 10:00.
pub const WEEKLY_TOP_CRON: &str = "0 0 10 * * Sun";

/// Starts the three notification jobs. Each fire invokes the dispatcher for
/// its own kind; a slow or failing job never delays the others. Fires missed
/// while the process is down are simply skipped.
pub async fn start_scheduler(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let scheduler = JobScheduler::new().await?;

    let jobs = [
        (DAILY_QUOTE_CRON, JobKind::DailyQuote),
        (AIRING_CHECK_CRON, JobKind::AiringCheck),
        (WEEKLY_TOP_CRON, JobKind::WeeklyTop),
    ];

    for (cron, kind) in jobs {
        let job_dispatcher = dispatcher.clone();
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let dispatcher = job_dispatcher.clone();
            Box::pin(async move {
                dispatcher.run_job(kind).await;
            })
        })?;
        scheduler.add(job).await?;
    }

    scheduler.start().await?;
    info!("Notification scheduler started");

    Ok(())
}
