//! Settings read from the key/value configuration provider.

use std::fmt;

use imagehub_core::traits::ConfigProvider;
use imagehub_entity::Proxy;

/// Configuration keys consulted by the download monitor.
pub mod keys {
    /// Template size ceiling, in gigabytes.
    pub const MAX_TEMPLATE_SIZE: &str = "max.template.iso.size";
    /// Volume size ceiling, in gigabytes.
    pub const MAX_VOLUME_SIZE: &str = "storage.max.volume.upload.size";
    /// Whether copies between stores must be encrypted.
    pub const SECURE_COPY: &str = "secstorage.encrypt.copy";
    /// Proxy URL for fetching images.
    pub const PROXY: &str = "secstorage.proxy";
    /// Password for copying out of another store.
    pub const COPY_PASSWORD: &str = "secstorage.copy.password";
}

/// User name paired with the copy password.
pub const DEFAULT_HTTP_AUTH_USER: &str = "cloud";

const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// Read a size ceiling in gigabytes and return it in bytes.
///
/// A missing or malformed value means no limit.
pub fn size_ceiling_bytes(provider: &dyn ConfigProvider, key: &str) -> Option<u64> {
    let raw = provider.get_value(key)?;
    match raw.trim().parse::<u64>() {
        Ok(gigabytes) => gigabytes.checked_mul(BYTES_PER_GIB),
        Err(_) => {
            tracing::debug!(key, value = %raw, "Ignoring malformed size ceiling");
            None
        }
    }
}

/// Settings applied to every outgoing download command.
#[derive(Clone, Default)]
pub struct CopySettings {
    pub secure_copy: bool,
    pub proxy: Option<Proxy>,
    pub copy_password: Option<String>,
}

impl CopySettings {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        let secure_copy = provider
            .get_value(keys::SECURE_COPY)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

        let proxy = provider.get_value(keys::PROXY).and_then(|raw| {
            let parsed = Proxy::parse(&raw);
            if parsed.is_none() {
                tracing::warn!(value = %raw, "Ignoring unparseable proxy setting");
            }
            parsed
        });

        let copy_password = provider
            .get_value(keys::COPY_PASSWORD)
            .filter(|password| !password.is_empty());

        Self {
            secure_copy,
            proxy,
            copy_password,
        }
    }
}

impl fmt::Debug for CopySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopySettings")
            .field("secure_copy", &self.secure_copy)
            .field("proxy", &self.proxy)
            .field(
                "copy_password",
                &self.copy_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
