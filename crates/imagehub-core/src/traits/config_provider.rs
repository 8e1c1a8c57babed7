//! Raw key/value configuration lookups.

/// Source of raw configuration values addressed by dotted keys
/// (e.g. `"max.template.iso.size"`).
///
/// Interpretation of the returned string is left to the caller; a
/// missing key and an unreadable value both yield `None`.
pub trait ConfigProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Look up the raw value for `key`.
    fn get_value(&self, key: &str) -> Option<String>;
}
