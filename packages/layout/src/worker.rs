//! # Publish Worker
//!
//! Background task that promotes scheduled publishes. It checks once
//! immediately and then once per period, reloading settings from the store
//! before each check so schedules written elsewhere are picked up.
//!
//! Store failures are logged and the next tick retries. Outcomes can be
//! observed through an optional channel.

use crate::store::SettingsStore;
use crate::workflow::PublishCheck;
use crate::SettingsService;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default polling period
pub const PUBLISH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running publish worker
pub struct PublishWorker<S: SettingsStore> {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<SettingsService<S>>,
}

impl<S> PublishWorker<S>
where
    S: SettingsStore + Send + 'static,
{
    /// Spawn the worker on the current tokio runtime
    ///
    /// `clock` supplies the time passed to each check.
    pub fn spawn<C>(
        mut service: SettingsService<S>,
        period: Duration,
        clock: C,
        outcomes: Option<mpsc::UnboundedSender<PublishCheck>>,
    ) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
    {
        let (stop, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Err(err) = service.reload() {
                            warn!("publish worker could not reload settings: {}", err);
                            continue;
                        }
                        match service.run_publish_check(clock()) {
                            Ok(outcome) => {
                                if let Some(tx) = &outcomes {
                                    let _ = tx.send(outcome);
                                }
                            }
                            Err(err) => warn!("publish check failed: {}", err),
                        }
                    }
                }
            }

            debug!("publish worker stopped");
            service
        });

        Self { stop, handle }
    }

    /// Stop polling and hand the service back
    pub async fn stop(self) -> Option<SettingsService<S>> {
        let _ = self.stop.send(());
        self.handle.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workflow::PublishStatus;
    use chrono::TimeZone;
    use tokio::time::Instant;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    /// Wall clock that follows tokio's paused time
    fn virtual_clock() -> impl Fn() -> DateTime<Utc> + Send + 'static {
        let origin = Instant::now();
        move || start() + chrono::Duration::from_std(origin.elapsed()).unwrap()
    }

    fn scheduled_in(minutes: i64) -> SettingsService<MemoryStore> {
        let mut svc = SettingsService::open(MemoryStore::new()).unwrap();
        svc.schedule_publish(Some(start() + chrono::Duration::minutes(minutes)), start())
            .unwrap();
        svc
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotes_once_across_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = PublishWorker::spawn(scheduled_in(2), Duration::from_secs(60), virtual_clock(), Some(tx));

        tokio::time::sleep(Duration::from_secs(60 * 5 + 1)).await;
        let svc = worker.stop().await.unwrap();

        let mut outcomes = Vec::new();
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }

        assert_eq!(outcomes.len(), 6);
        assert!(matches!(outcomes[0], PublishCheck::NotDueYet { .. }));
        assert!(matches!(outcomes[1], PublishCheck::NotDueYet { .. }));
        assert!(outcomes[2].promoted());
        assert!(outcomes[3..].iter().all(|outcome| *outcome == PublishCheck::NotScheduled));

        assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = PublishWorker::spawn(scheduled_in(-1), PUBLISH_CHECK_INTERVAL, virtual_clock(), Some(tx));

        assert!(rx.recv().await.unwrap().promoted());
        worker.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_schedule() {
        let svc = SettingsService::open(MemoryStore::new()).unwrap();
        let worker = PublishWorker::spawn(svc, PUBLISH_CHECK_INTERVAL, virtual_clock(), None);

        tokio::task::yield_now().await;
        let svc = worker.stop().await.unwrap();
        assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Draft);
        assert_eq!(svc.store().saves(), 0);
    }
}
