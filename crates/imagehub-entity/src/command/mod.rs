//! Commands sent to transfer agents and the answers they report back.

pub mod answer;
pub mod download;
pub mod proxy;

pub use answer::DownloadAnswer;
pub use download::{AgentCommand, DownloadCommand, ProgressCommand, RequestType};
pub use proxy::{Credentials, Proxy};
