//! The listener actor: one task per dispatched job.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Sleep};
use tokio_util::sync::CancellationToken;

use imagehub_core::config::TransferConfig;
use imagehub_core::error::AppError;
use imagehub_core::result::AppResult;
use imagehub_entity::{
    AgentCommand, DownloadAnswer, DownloadStatus, JobIdentity, ProgressCommand, RequestType,
};

use super::ListenerParams;
use super::handle::{AnswerSink, ListenerEvent, ListenerId};
use super::state::{ListenerSnapshot, ListenerState};
use crate::outcome::{CompletionCallback, TransferFailure, TransferOutcome};
use crate::registry::JobRegistry;
use crate::traits::{Endpoint, RecordStore};

/// Reload-and-reapply attempts when the record store reports a stale write.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Outstanding status check.
struct StatusCheck {
    request: RequestType,
    sleep: Pin<Box<Sleep>>,
}

pub(crate) struct ListenerActor {
    id: ListenerId,
    identity: JobIdentity,
    endpoint: Arc<dyn Endpoint>,
    command: AgentCommand,
    store: Arc<dyn RecordStore>,
    registry: Arc<JobRegistry>,
    timing: TransferConfig,
    job_id: Option<String>,
    callback: Option<CompletionCallback>,
    state: ListenerState,
    last_status: Option<DownloadStatus>,
    /// Consecutive transport failures since the last answer.
    failures: u32,
    sink: AnswerSink,
    events: mpsc::UnboundedReceiver<ListenerEvent>,
    cancel: CancellationToken,
    snapshot: watch::Sender<ListenerSnapshot>,
    timer: Option<StatusCheck>,
}

impl ListenerActor {
    pub(crate) fn new(
        id: ListenerId,
        params: ListenerParams,
        sink: AnswerSink,
        events: mpsc::UnboundedReceiver<ListenerEvent>,
        cancel: CancellationToken,
        snapshot: watch::Sender<ListenerSnapshot>,
    ) -> Self {
        let mut actor = Self {
            id,
            identity: params.identity,
            endpoint: params.endpoint,
            command: params.command,
            store: params.store,
            registry: params.registry,
            timing: params.timing,
            job_id: params.job_id.filter(|id| !id.is_empty()),
            callback: params.callback,
            state: ListenerState::Pending,
            last_status: params.prior_status,
            failures: 0,
            sink,
            events,
            cancel,
            snapshot,
            timer: None,
        };
        actor.arm_watchdog();
        actor
    }

    pub(crate) async fn run(mut self) {
        tracing::debug!(
            listener = %self.id,
            identity = %self.identity,
            endpoint = self.endpoint.id(),
            "Listener started"
        );

        while !self.state.is_terminal() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.abandon();
                }
                Some(event) = self.events.recv() => {
                    self.on_event(event).await;
                }
                request = next_status_check(&mut self.timer) => {
                    self.send_status_check(request).await;
                }
            }
        }

        tracing::debug!(
            listener = %self.id,
            identity = %self.identity,
            state = %self.state,
            "Listener stopped"
        );
    }

    async fn on_event(&mut self, event: ListenerEvent) {
        match event {
            ListenerEvent::Answer(answer) => self.on_answer(answer).await,
            ListenerEvent::Disconnected(reason) => self.on_disconnected(&reason),
        }
    }

    async fn on_answer(&mut self, answer: DownloadAnswer) {
        if self.state.is_terminal() {
            return;
        }

        self.failures = 0;
        if let Some(job_id) = answer.job_id.as_ref().filter(|id| !id.is_empty()) {
            self.job_id = Some(job_id.clone());
        }
        self.last_status = Some(answer.status);
        self.set_state(ListenerState::Pending);

        let persisted = self.persist_answer(&answer).await;
        if self.cancel.is_cancelled() {
            return;
        }
        if let Err(err) = persisted {
            tracing::error!(
                listener = %self.id,
                identity = %self.identity,
                status = %answer.status,
                "Failed to record transfer answer: {}",
                err
            );
            let interval = self.timing.status_poll_interval();
            self.schedule(RequestType::StatusOnly, interval);
            return;
        }

        if answer.status.is_success() {
            tracing::info!(
                identity = %self.identity,
                job_id = self.job_id.as_deref().unwrap_or(""),
                size = answer.size,
                "Transfer completed"
            );
            self.finish(ListenerState::Completed, Ok(answer)).await;
        } else if answer.status.is_failure() {
            let failure = TransferFailure::from_answer(self.identity, answer);
            tracing::warn!(
                identity = %self.identity,
                status = %failure.status,
                "Transfer failed: {}",
                failure.message
            );
            self.finish(ListenerState::Failed, Err(failure)).await;
        } else {
            tracing::debug!(
                identity = %self.identity,
                status = %answer.status,
                progress = answer.progress_percent,
                "Transfer progress"
            );
            let interval = self.timing.status_poll_interval();
            self.schedule(RequestType::StatusOnly, interval);
        }
    }

    /// Fold the answer into the stored record, reloading on stale writes.
    async fn persist_answer(&mut self, answer: &DownloadAnswer) -> AppResult<()> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let mut record = self.store.find(&self.identity).await?.ok_or_else(|| {
                AppError::not_found(format!("No job record for {}", self.identity))
            })?;
            record.apply_answer(answer);

            // Abandonment drops an in-flight write.
            let updated = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(()),
                updated = self.store.update(&record) => updated?,
            };
            if updated {
                return Ok(());
            }
            tracing::debug!(
                identity = %self.identity,
                attempt,
                "Job record changed underneath, reloading"
            );
        }

        Err(AppError::conflict(format!(
            "Job record for {} kept changing after {} attempts",
            self.identity, MAX_UPDATE_ATTEMPTS
        )))
    }

    async fn finish(&mut self, state: ListenerState, outcome: TransferOutcome) {
        self.timer = None;
        self.registry.deregister(&self.identity, self.id).await;

        // A displaced listener never reports back.
        if self.cancel.is_cancelled() {
            return;
        }

        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
        self.set_state(state);
    }

    fn on_disconnected(&mut self, reason: &str) {
        if self.state.is_terminal() {
            return;
        }

        self.failures = self.failures.saturating_add(1);
        let delay = if self.failures == 1 {
            self.timing.retry_delay()
        } else {
            self.timing.status_poll_interval()
        };

        tracing::warn!(
            identity = %self.identity,
            endpoint = self.endpoint.id(),
            failures = self.failures,
            retry_in_ms = delay.as_millis() as u64,
            "Lost contact with transfer agent: {}",
            reason
        );

        self.set_state(ListenerState::Disconnected);
        self.schedule(RequestType::GetOrRestart, delay);
    }

    async fn send_status_check(&mut self, request: RequestType) {
        let Some(command) = self.status_command(request) else {
            tracing::debug!(
                identity = %self.identity,
                request = %request,
                "No remote job yet, waiting for the agent"
            );
            return;
        };
        tracing::debug!(
            identity = %self.identity,
            job_id = self.job_id.as_deref().unwrap_or(""),
            request = %request,
            "Sending status check"
        );

        match self.endpoint.send_async(command, self.sink.clone()).await {
            Ok(()) => self.arm_watchdog(),
            Err(err) => self.on_disconnected(&err.to_string()),
        }
    }

    /// Query the known remote job. Without a job id there is nothing to
    /// query; the original command is resent only after the agent was lost.
    fn status_command(&self, request: RequestType) -> Option<AgentCommand> {
        match &self.job_id {
            Some(job_id) => Some(
                ProgressCommand::new(self.command.download().clone(), job_id.clone(), request)
                    .into(),
            ),
            None if self.failures > 0 => Some(self.command.clone()),
            None => None,
        }
    }

    /// Follow up on a silent agent, once it has named the remote job.
    fn arm_watchdog(&mut self) {
        if self.job_id.is_some() {
            let interval = self.timing.status_poll_interval();
            self.schedule(RequestType::GetOrRestart, interval);
        }
    }

    fn abandon(&mut self) {
        self.timer = None;
        self.callback = None;
        tracing::debug!(
            listener = %self.id,
            identity = %self.identity,
            "Listener abandoned"
        );
        self.set_state(ListenerState::Abandoned);
    }

    fn schedule(&mut self, request: RequestType, delay: Duration) {
        self.timer = Some(StatusCheck {
            request,
            sleep: Box::pin(time::sleep(delay)),
        });
    }

    fn set_state(&mut self, state: ListenerState) {
        self.state = state;
        self.snapshot.send_replace(ListenerSnapshot {
            state,
            last_status: self.last_status,
        });
    }
}

/// Resolve when the outstanding status check is due; never resolves when
/// none is scheduled.
async fn next_status_check(timer: &mut Option<StatusCheck>) -> RequestType {
    match timer {
        Some(check) => {
            check.sleep.as_mut().await;
            let request = check.request;
            *timer = None;
            request
        }
        None => std::future::pending().await,
    }
}
