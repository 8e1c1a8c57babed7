//! Fakes shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use imagehub_core::config::TransferConfig;
use imagehub_core::error::AppError;
use imagehub_core::result::AppResult;
use imagehub_entity::{AgentCommand, ResourceDescriptor};

use crate::listener::AnswerSink;
use crate::outcome::{CompletionCallback, TransferOutcome};
use crate::traits::{Endpoint, EndpointSelector};

pub(crate) fn timing() -> TransferConfig {
    TransferConfig {
        status_poll_interval_ms: 1_000,
        retry_delay_ms: 100,
    }
}

/// Endpoint that records every command it accepts.
#[derive(Debug)]
pub(crate) struct RecordingEndpoint {
    id: String,
    commands: Mutex<Vec<AgentCommand>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingEndpoint {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            commands: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every later send fail immediately.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Commands accepted so far.
    pub(crate) fn commands(&self) -> Vec<AgentCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Sends attempted so far, failed ones included.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Endpoint for RecordingEndpoint {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_async(&self, command: AgentCommand, _sink: AnswerSink) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::transport(format!("{} unreachable", self.id)));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

/// Selector that always returns the same endpoint, or none.
#[derive(Debug)]
pub(crate) struct StaticSelector {
    endpoint: Option<Arc<dyn Endpoint>>,
}

impl StaticSelector {
    pub(crate) fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            endpoint: Some(endpoint),
        }
    }

    pub(crate) fn empty() -> Self {
        Self { endpoint: None }
    }
}

#[async_trait]
impl EndpointSelector for StaticSelector {
    async fn select(&self, _resource: &ResourceDescriptor) -> Option<Arc<dyn Endpoint>> {
        self.endpoint.clone()
    }
}

/// Collects the outcomes handed to completion callbacks.
#[derive(Clone, Default)]
pub(crate) struct CallbackProbe {
    outcomes: Arc<Mutex<Vec<TransferOutcome>>>,
}

impl CallbackProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn callback(&self) -> CompletionCallback {
        let outcomes = self.outcomes.clone();
        Box::new(move |outcome| outcomes.lock().unwrap().push(outcome))
    }

    pub(crate) fn count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub(crate) fn outcomes(&self) -> Vec<TransferOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}
