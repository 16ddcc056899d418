//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can talk to a backend
//! running locally with zero configuration.

use std::fmt;
use std::time::Duration;

use pawchat_shared::constants::{
    DEFAULT_API_URL, HISTORY_PAGE_SIZE, MAX_HISTORY_PAGE_SIZE, MIN_POLL_INTERVAL_MS,
    POLL_INTERVAL_MS, REQUEST_TIMEOUT_SECS,
};

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the chat backend.
    /// Env: `PAWCHAT_API_URL`
    /// Default: `http://localhost:8080`
    pub base_url: String,

    /// Session token sent as a bearer credential, if any. The cookie store
    /// is always enabled as well.
    /// Env: `PAWCHAT_SESSION_TOKEN`
    pub session_token: Option<String>,

    /// Delay between poll ticks.
    /// Env: `PAWCHAT_POLL_INTERVAL_MS`
    /// Default: 2000 ms
    pub poll_interval: Duration,

    /// Messages fetched when a conversation opens.
    /// Env: `PAWCHAT_HISTORY_PAGE_SIZE`
    /// Default: 50
    pub history_page_size: u32,

    /// Timeout applied to every request.
    /// Env: `PAWCHAT_REQUEST_TIMEOUT_SECS`
    /// Default: 10 s
    pub request_timeout: Duration,

    /// Whether opening a conversation marks the peer's messages read.
    /// Env: `PAWCHAT_MARK_READ` (true/false)
    /// Default: `true`
    pub mark_read_on_open: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            session_token: None,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            history_page_size: HISTORY_PAGE_SIZE,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            mark_read_on_open: true,
        }
    }
}

// Hand-written so the session token never ends up in logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("poll_interval", &self.poll_interval)
            .field("history_page_size", &self.history_page_size)
            .field("request_timeout", &self.request_timeout)
            .field("mark_read_on_open", &self.mark_read_on_open)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("PAWCHAT_API_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }

        if let Some(token) = lookup("PAWCHAT_SESSION_TOKEN") {
            if !token.is_empty() {
                config.session_token = Some(token);
            }
        }

        if let Some(val) = lookup("PAWCHAT_POLL_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms >= MIN_POLL_INTERVAL_MS => {
                    config.poll_interval = Duration::from_millis(ms);
                }
                _ => tracing::warn!(
                    value = %val,
                    min = MIN_POLL_INTERVAL_MS,
                    "Invalid PAWCHAT_POLL_INTERVAL_MS, using default"
                ),
            }
        }

        if let Some(val) = lookup("PAWCHAT_HISTORY_PAGE_SIZE") {
            match val.parse::<u32>() {
                Ok(n) if (1..=MAX_HISTORY_PAGE_SIZE).contains(&n) => config.history_page_size = n,
                _ => tracing::warn!(
                    value = %val,
                    max = MAX_HISTORY_PAGE_SIZE,
                    "Invalid PAWCHAT_HISTORY_PAGE_SIZE, using default"
                ),
            }
        }

        if let Some(val) = lookup("PAWCHAT_REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid PAWCHAT_REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(val) = lookup("PAWCHAT_MARK_READ") {
            config.mark_read_on_open = val != "false" && val != "0";
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(2_000));
        assert_eq!(config.history_page_size, 50);
        assert!(config.mark_read_on_open);
        assert!(config.session_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PAWCHAT_API_URL", "https://pets.example.org"),
            ("PAWCHAT_SESSION_TOKEN", "s3cret"),
            ("PAWCHAT_POLL_INTERVAL_MS", "500"),
            ("PAWCHAT_HISTORY_PAGE_SIZE", "20"),
            ("PAWCHAT_REQUEST_TIMEOUT_SECS", "3"),
            ("PAWCHAT_MARK_READ", "0"),
        ]));
        assert_eq!(config.base_url, "https://pets.example.org");
        assert_eq!(config.session_token.as_deref(), Some("s3cret"));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.history_page_size, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(!config.mark_read_on_open);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PAWCHAT_POLL_INTERVAL_MS", "5"),
            ("PAWCHAT_HISTORY_PAGE_SIZE", "9999"),
            ("PAWCHAT_REQUEST_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.poll_interval, Duration::from_millis(2_000));
        assert_eq!(config.history_page_size, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            session_token: Some("s3cret".into()),
            ..ClientConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("<redacted>"));
    }
}
