//! HTTP proxy and copy credentials attached to download commands.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP proxy the agent should fetch through.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    /// Proxy host name.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Optional proxy user.
    pub user: Option<String>,
    /// Optional proxy password.
    pub password: Option<String>,
}

impl Proxy {
    /// Parse a proxy from a URL such as `http://user:pw@proxy:3128`.
    ///
    /// Returns `None` when the URL is malformed or has no host.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw.trim()).ok()?;
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default().unwrap_or(80);
        let user = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let password = url.password().map(str::to_string);
        Some(Self {
            host,
            port,
            user,
            password,
        })
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Basic-auth credentials the agent presents when copying from another
/// store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}
