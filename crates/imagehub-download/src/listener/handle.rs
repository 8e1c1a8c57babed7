//! Handle to a running listener actor and the sink agents report through.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use imagehub_entity::{DownloadAnswer, DownloadStatus, JobIdentity};

use super::ListenerParams;
use super::actor::ListenerActor;
use super::state::{ListenerSnapshot, ListenerState};

/// Unique identifier of one listener instance.
pub type ListenerId = Uuid;

/// Message delivered to a listener actor.
#[derive(Debug)]
pub(crate) enum ListenerEvent {
    /// The agent reported progress or an outcome.
    Answer(DownloadAnswer),
    /// The transport lost contact with the agent.
    Disconnected(String),
}

/// Channel through which an endpoint reports back to the listener that
/// dispatched a command.
#[derive(Debug, Clone)]
pub struct AnswerSink {
    listener_id: ListenerId,
    tx: mpsc::UnboundedSender<ListenerEvent>,
}

impl AnswerSink {
    pub(crate) fn new(listener_id: ListenerId, tx: mpsc::UnboundedSender<ListenerEvent>) -> Self {
        Self { listener_id, tx }
    }

    /// Listener this sink feeds.
    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Hand an answer to the listener. Returns `false` once the listener
    /// has stopped.
    pub fn deliver(&self, answer: DownloadAnswer) -> bool {
        self.tx.send(ListenerEvent::Answer(answer)).is_ok()
    }

    /// Report that the agent can no longer be reached.
    pub fn report_failure(&self, reason: impl Into<String>) -> bool {
        self.tx
            .send(ListenerEvent::Disconnected(reason.into()))
            .is_ok()
    }

    /// Whether the listener has stopped accepting events.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner-side handle of a listener actor.
///
/// The handle is what the [`JobRegistry`](crate::JobRegistry) stores; the
/// actor task itself owns the mutable listener state.
#[derive(Debug)]
pub struct ListenerHandle {
    id: ListenerId,
    identity: JobIdentity,
    endpoint_id: String,
    sink: AnswerSink,
    cancel: CancellationToken,
    snapshot: watch::Receiver<ListenerSnapshot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ListenerHandle {
    /// Start a listener actor on the current runtime.
    ///
    /// When the remote job id is already known the actor arms a
    /// status-check watchdog immediately, so a resumed job that is never
    /// answered is still followed up.
    pub fn spawn(params: ListenerParams) -> Arc<Self> {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = AnswerSink::new(id, tx);
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(ListenerSnapshot::new(params.prior_status));

        let identity = params.identity;
        let endpoint_id = params.endpoint.id().to_string();
        let actor = ListenerActor::new(id, params, sink.clone(), rx, cancel.clone(), snapshot_tx);
        let task = tokio::spawn(actor.run());

        Arc::new(Self {
            id,
            identity,
            endpoint_id,
            sink,
            cancel,
            snapshot: snapshot_rx,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn identity(&self) -> JobIdentity {
        self.identity
    }

    /// Endpoint the listener's command was dispatched through.
    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    /// Sink to pass to the endpoint along with the command.
    pub fn sink(&self) -> AnswerSink {
        self.sink.clone()
    }

    /// Current listener state.
    pub fn state(&self) -> ListenerState {
        self.snapshot.borrow().state
    }

    /// Last status reported by the agent, or the restored prior status.
    pub fn last_status(&self) -> Option<DownloadStatus> {
        self.snapshot.borrow().last_status
    }

    /// Tell the listener its agent went away.
    pub fn mark_disconnected(&self, reason: impl Into<String>) -> bool {
        self.sink.report_failure(reason)
    }

    /// Whether the listener has been told to abandon.
    pub fn is_abandoned(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Signal abandonment without waiting for the actor.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the listener without invoking its callback and wait for the
    /// actor to exit.
    pub async fn abandon(&self) {
        self.cancel();
        let task = self.task.lock().await.take();
        let Some(task) = task else {
            return;
        };
        match task.await {
            Ok(()) => {}
            Err(err) if err.is_panic() => {
                tracing::error!(
                    listener = %self.id,
                    identity = %self.identity,
                    "Listener task panicked: {}",
                    err
                );
            }
            Err(_) => {}
        }
    }

    /// Wait until the listener reaches a terminal state and return it.
    pub async fn wait_for_terminal(&self) -> ListenerState {
        let mut rx = self.snapshot.clone();
        let state = rx
            .wait_for(|snapshot| snapshot.state.is_terminal())
            .await
            .map(|snapshot| snapshot.state);
        state.unwrap_or_else(|_| self.state())
    }
}
