//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use imagehub::imagehub_core::config::{StaticConfigProvider, TransferConfig};
use imagehub::imagehub_core::error::AppError;
use imagehub::imagehub_core::result::AppResult;
use imagehub::imagehub_core::types::{ResourceId, StoreId};
use imagehub::imagehub_download::{
    AnswerSink, CompletionCallback, DownloadMonitor, Endpoint, EndpointSelector,
    MemoryRecordStore, TransferOutcome,
};
use imagehub::imagehub_entity::{
    AgentCommand, ImageFormat, RegisterVolumePayload, ResourceDescriptor, StoreRef, StoreRole,
    TemplateResource, VolumeResource,
};

pub const POLL: Duration = Duration::from_millis(1_000);
pub const RETRY: Duration = Duration::from_millis(100);

pub fn timing() -> TransferConfig {
    TransferConfig {
        status_poll_interval_ms: POLL.as_millis() as u64,
        retry_delay_ms: RETRY.as_millis() as u64,
    }
}

/// A transfer agent that records what it is sent and lets the test answer.
#[derive(Debug)]
pub struct FakeAgent {
    id: String,
    sent: Mutex<Vec<(AgentCommand, AnswerSink)>>,
    down: Mutex<bool>,
}

impl FakeAgent {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            sent: Mutex::new(Vec::new()),
            down: Mutex::new(false),
        })
    }

    /// Reject every send until brought back up.
    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }

    pub fn commands(&self) -> Vec<AgentCommand> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    pub fn last_command(&self) -> AgentCommand {
        self.commands().pop().expect("agent received no command")
    }

    /// Sink of the most recent command, for answering it.
    pub fn last_sink(&self) -> AnswerSink {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, sink)| sink.clone())
            .expect("agent received no command")
    }
}

#[async_trait]
impl Endpoint for FakeAgent {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_async(&self, command: AgentCommand, sink: AnswerSink) -> AppResult<()> {
        if *self.down.lock().unwrap() {
            return Err(AppError::transport(format!("agent {} is down", self.id)));
        }
        self.sent.lock().unwrap().push((command, sink));
        Ok(())
    }
}

/// Routes every resource to one agent, if any.
#[derive(Debug)]
pub struct FakeSelector {
    agent: Option<Arc<FakeAgent>>,
}

impl FakeSelector {
    pub fn new(agent: Arc<FakeAgent>) -> Self {
        Self { agent: Some(agent) }
    }

    pub fn empty() -> Self {
        Self { agent: None }
    }
}

#[async_trait]
impl EndpointSelector for FakeSelector {
    async fn select(&self, _resource: &ResourceDescriptor) -> Option<Arc<dyn Endpoint>> {
        self.agent
            .clone()
            .map(|agent| agent as Arc<dyn Endpoint>)
    }
}

/// Counts completion callbacks and keeps their outcomes.
#[derive(Clone, Default)]
pub struct CallbackProbe {
    outcomes: Arc<Mutex<Vec<TransferOutcome>>>,
}

impl CallbackProbe {
    pub fn callback(&self) -> CompletionCallback {
        let outcomes = self.outcomes.clone();
        Box::new(move |outcome| outcomes.lock().unwrap().push(outcome))
    }

    pub fn count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub fn outcomes(&self) -> Vec<TransferOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

/// A monitor wired to in-memory collaborators.
pub struct TestHub {
    pub store: Arc<MemoryRecordStore>,
    pub agent: Arc<FakeAgent>,
    pub monitor: DownloadMonitor,
}

impl TestHub {
    pub fn new() -> Self {
        Self::with_settings(StaticConfigProvider::new())
    }

    pub fn with_settings(settings: StaticConfigProvider) -> Self {
        Self::build(settings, true)
    }

    /// A hub whose selector never finds an agent.
    pub fn without_agent() -> Self {
        Self::build(StaticConfigProvider::new(), false)
    }

    fn build(settings: StaticConfigProvider, with_agent: bool) -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let agent = FakeAgent::new("ssvm-1");
        let selector = if with_agent {
            FakeSelector::new(agent.clone())
        } else {
            FakeSelector::empty()
        };
        let monitor = DownloadMonitor::new(
            store.clone(),
            Arc::new(selector),
            Arc::new(settings),
            timing(),
        );
        Self {
            store,
            agent,
            monitor,
        }
    }
}

pub fn template(id: u64) -> TemplateResource {
    TemplateResource {
        id: ResourceId(id),
        name: format!("template-{id}"),
        store: StoreRef::new(StoreId(1), StoreRole::Image, "secondary-1"),
        url: Some(format!("http://images.local/template-{id}.qcow2")),
        checksum: None,
        format: Some(ImageFormat::Qcow2),
    }
}

pub fn volume(id: u64, format: &str) -> VolumeResource {
    VolumeResource {
        id: ResourceId(id),
        name: format!("volume-{id}"),
        store: StoreRef::new(StoreId(1), StoreRole::Image, "secondary-1"),
        payload: RegisterVolumePayload {
            url: format!("http://images.local/volume-{id}.img"),
            checksum: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            format: format.to_string(),
        },
    }
}

/// Let every ready task run without moving the clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
