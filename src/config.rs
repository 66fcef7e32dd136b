use std::time::Duration;

/// Installer timing knobs.
///
/// Every field can be overridden through a `TREEDOC_*` environment variable;
/// unset or unparsable values fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Upper bound for the runtime installer child process.
    pub runtime_install_timeout: Duration,
    /// Upper bound for every other install mechanism.
    pub install_timeout: Duration,
    /// Upper bound for version and import queries run while probing.
    pub query_timeout: Duration,
    /// Presence checks performed after an install mechanism returns.
    pub verify_attempts: u32,
    /// Delay between two verification presence checks.
    pub verify_delay: Duration,
}

pub const RUNTIME_TIMEOUT_ENV: &str = "TREEDOC_RUNTIME_TIMEOUT";
pub const INSTALL_TIMEOUT_ENV: &str = "TREEDOC_INSTALL_TIMEOUT";
pub const QUERY_TIMEOUT_ENV: &str = "TREEDOC_QUERY_TIMEOUT";
pub const VERIFY_ATTEMPTS_ENV: &str = "TREEDOC_VERIFY_ATTEMPTS";
pub const VERIFY_DELAY_ENV: &str = "TREEDOC_VERIFY_DELAY_MS";

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            runtime_install_timeout: Duration::from_secs(900),
            install_timeout: Duration::from_secs(300),
            query_timeout: Duration::from_secs(15),
            verify_attempts: 10,
            verify_delay: Duration::from_millis(1000),
        }
    }
}

impl InstallerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("ignoring {key}={raw:?}: expected a non-negative integer");
                    None
                }
            }
        };

        Self {
            runtime_install_timeout: read(RUNTIME_TIMEOUT_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.runtime_install_timeout),
            install_timeout: read(INSTALL_TIMEOUT_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.install_timeout),
            query_timeout: read(QUERY_TIMEOUT_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.query_timeout),
            // INVARIANT: at least one verification check always runs.
            verify_attempts: read(VERIFY_ATTEMPTS_ENV)
                .and_then(|n| u32::try_from(n).ok())
                .map(|n| n.max(1))
                .unwrap_or(defaults.verify_attempts),
            verify_delay: read(VERIFY_DELAY_ENV)
                .map(Duration::from_millis)
                .unwrap_or(defaults.verify_delay),
        }
    }
}
