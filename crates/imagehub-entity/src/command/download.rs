//! Download and status-check commands.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::proxy::{Credentials, Proxy};
use crate::record::JobIdentity;
use crate::resource::ImageFormat;

/// Request a fresh transfer of a resource into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCommand {
    /// Which resource goes to which store.
    pub identity: JobIdentity,
    /// Human-readable resource name.
    pub name: String,
    /// Source URL.
    pub url: String,
    /// Expected checksum of the image, if known.
    pub checksum: Option<String>,
    /// Image format, if known.
    pub format: Option<ImageFormat>,
    /// Reject images larger than this many bytes. `None` = unlimited.
    pub max_size_bytes: Option<u64>,
    /// HTTP proxy to fetch through.
    pub proxy: Option<Proxy>,
    /// Credentials for copying out of another store.
    pub credentials: Option<Credentials>,
    /// Whether copies between stores must use TLS.
    pub secure_copy: bool,
}

impl DownloadCommand {
    /// Create a command with no limits, proxy or credentials.
    pub fn new(identity: JobIdentity, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            identity,
            name: name.into(),
            url: url.into(),
            checksum: None,
            format: None,
            max_size_bytes: None,
            proxy: None,
            credentials: None,
            secure_copy: false,
        }
    }

    /// Set the size ceiling.
    pub fn with_max_size(mut self, max_size_bytes: Option<u64>) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Set the expected checksum.
    pub fn with_checksum(mut self, checksum: Option<String>) -> Self {
        self.checksum = checksum;
        self
    }

    /// Set the image format.
    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    /// Set the fetch proxy.
    pub fn with_proxy(mut self, proxy: Option<Proxy>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Set the secure-copy flag.
    pub fn with_secure_copy(mut self, secure_copy: bool) -> Self {
        self.secure_copy = secure_copy;
        self
    }

    /// Attach copy credentials.
    pub fn set_credentials(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some(Credentials::new(user, password));
    }
}

/// What a status check asks the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Only report the current status.
    StatusOnly,
    /// Report the status, restarting the job if the agent lost it.
    GetOrRestart,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusOnly => write!(f, "status_only"),
            Self::GetOrRestart => write!(f, "get_or_restart"),
        }
    }
}

/// Status check for a job the agent already knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCommand {
    /// The original download, so the agent can restart it.
    pub command: DownloadCommand,
    /// Remote job being queried.
    pub job_id: String,
    /// Kind of status request.
    pub request: RequestType,
}

impl ProgressCommand {
    /// Wrap a download command into a status check.
    pub fn new(command: DownloadCommand, job_id: impl Into<String>, request: RequestType) -> Self {
        Self {
            command,
            job_id: job_id.into(),
            request,
        }
    }
}

/// Any command dispatched to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Start a new transfer.
    Download(DownloadCommand),
    /// Query or resume an existing transfer.
    Progress(ProgressCommand),
}

impl AgentCommand {
    /// Identity of the job this command concerns.
    pub fn identity(&self) -> JobIdentity {
        self.download().identity
    }

    /// The underlying download description.
    pub fn download(&self) -> &DownloadCommand {
        match self {
            Self::Download(cmd) => cmd,
            Self::Progress(progress) => &progress.command,
        }
    }

    /// Status request kind, for status checks.
    pub fn request_type(&self) -> Option<RequestType> {
        match self {
            Self::Download(_) => None,
            Self::Progress(progress) => Some(progress.request),
        }
    }

    /// Remote job id, for status checks.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Download(_) => None,
            Self::Progress(progress) => Some(progress.job_id.as_str()),
        }
    }
}

impl From<DownloadCommand> for AgentCommand {
    fn from(cmd: DownloadCommand) -> Self {
        Self::Download(cmd)
    }
}

impl From<ProgressCommand> for AgentCommand {
    fn from(cmd: ProgressCommand) -> Self {
        Self::Progress(cmd)
    }
}
