use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt as _};
use futures::stream::{FuturesUnordered, StreamExt as _};
use loadrelay_report_model::{EngineScript, LifecycleEvent, PhaseInfo, ReportPost, StatsSnapshot};
use tokio::sync::mpsc;

use crate::context::RunnerContext;
use crate::error::{RunError, RunResult};
use crate::monitor::ResourceMonitor;
use crate::progress::ProgressCalculator;
use crate::{merge, plugins, script, summary};

/// A report post that has been dispatched but not yet settled.
type PendingPost = BoxFuture<'static, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Fetching the test, registering the report and merging the run settings.
    Preparing,
    /// The engine is running and lifecycle events are being relayed.
    Running,
    /// The engine is done, waiting for intermediate reports to settle.
    Draining,
    Finalized,
    Aborted,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives one run from fetching the test to posting the final status.
///
/// Report posts are dispatched in the order the engine emits events and run concurrently. Posts for
/// intermediate stats are counted until they settle, the final `done` status is only posted once
/// none are outstanding.
///
/// A termination signal ends the run immediately from any state, outstanding posts are abandoned.
pub struct RunOrchestrator {
    context: RunnerContext,
    state: RunState,
    pending_ops: usize,
    first_intermediate_sent: bool,
    monitor: ResourceMonitor,
}

impl RunOrchestrator {
    pub fn new(context: RunnerContext) -> Self {
        Self {
            context,
            state: RunState::Idle,
            pending_ops: 0,
            first_intermediate_sent: false,
            monitor: ResourceMonitor::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Intermediate stats posts that have been dispatched and not yet settled.
    pub fn pending_ops(&self) -> usize {
        self.pending_ops
    }

    pub async fn run(&mut self) -> RunResult<()> {
        let mut shutdown_listener = self.context.shutdown_listener();

        let outcome = tokio::select! {
            biased;
            _ = shutdown_listener.wait_for_shutdown() => None,
            result = self.drive() => Some(result),
        };

        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => {
                self.transition(RunState::Failed);
                Err(e)
            }
            None => {
                log::warn!("Test aborted with {} reports outstanding", self.pending_ops);
                self.transition(RunState::Aborted);
                Err(RunError::aborted())
            }
        }
    }

    async fn drive(&mut self) -> RunResult<()> {
        let script = self.prepare().await?;
        let events = self.context.engine().start(&script).await?;
        self.execute(events).await
    }

    async fn prepare(&mut self) -> RunResult<EngineScript> {
        self.transition(RunState::Preparing);
        let config = Arc::clone(self.context.config());
        let service = Arc::clone(self.context.service());

        let test = service
            .get_test(&config)
            .await
            .map_err(|source| RunError::Fetch {
                what: "test",
                source,
            })?;

        let processor_path = match test.file_id.as_deref() {
            Some(file_id) => {
                let content = service
                    .get_file(&config, file_id)
                    .await
                    .map_err(|source| RunError::Fetch {
                        what: "helper script",
                        source,
                    })?;
                Some(script::write_processor_file(
                    self.context.script_dir(),
                    &content,
                )?)
            }
            None => None,
        };

        service
            .create_report(&config, &test)
            .await
            .map_err(|source| RunError::ReportPost {
                action: "create",
                source,
            })?;

        log::info!("Starting test: {}, testId: {}", test.name, test.id);
        let mut script = test.script;
        plugins::inject_plugins(&mut script.config, &config)?;
        merge::update_test_parameters(&mut script.config, &config, processor_path.as_deref());

        Ok(script)
    }

    async fn execute(&mut self, mut events: mpsc::Receiver<LifecycleEvent>) -> RunResult<()> {
        self.transition(RunState::Running);
        let progress = ProgressCalculator::new(self.context.config());
        if progress.total_scenarios() == 0 {
            log::warn!("Cannot estimate the number of scenarios, progress will stay at 0%");
        }

        let mut stats_posts = FuturesUnordered::<PendingPost>::new();
        let mut phase_posts = FuturesUnordered::<PendingPost>::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(LifecycleEvent::PhaseStarted(info)) => {
                        phase_posts.push(self.on_phase_started(info));
                    }
                    Some(LifecycleEvent::PhaseCompleted) => {
                        log::info!("Phase completed - {}", chrono::Utc::now());
                    }
                    Some(LifecycleEvent::Stats(snapshot)) => {
                        stats_posts.push(self.on_stats(snapshot, &progress));
                    }
                    Some(LifecycleEvent::Done { report }) => {
                        log::debug!("Engine final report: {report}");
                        break;
                    }
                    None => return Err(RunError::EngineExited),
                },
                Some(()) = stats_posts.next(), if !stats_posts.is_empty() => self.settle_stats_post(),
                Some(()) = phase_posts.next(), if !phase_posts.is_empty() => {}
            }
        }

        self.drain(&mut stats_posts, &mut phase_posts).await;
        self.finalize().await
    }

    fn on_phase_started(&mut self, info: PhaseInfo) -> PendingPost {
        log::info!(
            "Starting phase: {} - {}",
            chrono::Utc::now(),
            info.to_json()
        );
        self.dispatch(ReportPost::started_phase(&info))
    }

    fn on_stats(&mut self, snapshot: StatsSnapshot, progress: &ProgressCalculator) -> PendingPost {
        self.pending_ops += 1;

        let percent = progress.percent(snapshot.scenarios_settled());
        log::info!("Completed {percent}%");
        log::debug!(
            "Intermediate report: {} scenarios completed, {} avoided",
            snapshot.completed_scenarios,
            snapshot.scenarios_avoided
        );
        if let Some(table) = summary::intermediate_report_table(&snapshot.report) {
            log::info!("Intermediate report\n{table}");
        }
        self.monitor.log_usage();

        let first = !self.first_intermediate_sent;
        self.first_intermediate_sent = true;

        self.dispatch(ReportPost::intermediate(
            first,
            snapshot.into_shippable_report(),
        ))
    }

    fn settle_stats_post(&mut self) {
        debug_assert!(self.pending_ops > 0, "settled more stats posts than dispatched");
        self.pending_ops = self.pending_ops.saturating_sub(1);
    }

    /// Post a status update in the background. Failures are logged and otherwise ignored.
    fn dispatch(&self, post: ReportPost) -> PendingPost {
        let service = Arc::clone(self.context.service());
        let config = Arc::clone(self.context.config());

        async move {
            if let Err(e) = service.post_stats(&config, &post).await {
                log::warn!("Failed to post {} stats: {e}", post.phase_status);
            }
        }
        .boxed()
    }

    async fn drain(
        &mut self,
        stats_posts: &mut FuturesUnordered<PendingPost>,
        phase_posts: &mut FuturesUnordered<PendingPost>,
    ) {
        self.transition(RunState::Draining);
        if self.pending_ops > 0 {
            log::info!(
                "Waiting for {} intermediate reports to complete",
                self.pending_ops
            );
        }

        while self.pending_ops > 0 {
            tokio::select! {
                Some(()) = stats_posts.next() => self.settle_stats_post(),
                Some(()) = phase_posts.next(), if !phase_posts.is_empty() => {}
                else => break,
            }
        }
    }

    async fn finalize(&mut self) -> RunResult<()> {
        self.context
            .service()
            .post_stats(self.context.config(), &ReportPost::done())
            .await
            .map_err(|source| {
                log::error!("Failed to send final report to the control service");
                RunError::ReportPost {
                    action: "finalize",
                    source,
                }
            })?;

        self.transition(RunState::Finalized);
        Ok(())
    }

    fn transition(&mut self, next: RunState) {
        log::info!("Run state {} -> {}", self.state, next);
        self.state = next;
    }
}
