//! Client configuration.
//!
//! # Design
//! Defaults reproduce the wrapper's fixed baseline: redirects followed up to
//! ten hops with `Referer` set automatically, a ten second total timeout, and
//! TLS certificate and hostname checks **disabled**. The last default is a
//! known weakness kept for compatibility; set `verify_tls` to `true` (or
//! `EASYREQ_VERIFY_TLS=1`) for anything talking to untrusted networks.

use std::time::Duration;

use serde::Deserialize;

/// Baseline options applied when a client acquires its engine handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub verify_tls: bool,
    pub timeout_secs: u64,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub auto_referer: bool,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout_secs: 10,
            follow_redirects: true,
            max_redirects: 10,
            auto_referer: true,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `EASYREQ_VERIFY_TLS`, `EASYREQ_TIMEOUT_SECS`
    /// and `EASYREQ_MAX_REDIRECTS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(verify) = lookup("EASYREQ_VERIFY_TLS").and_then(|v| parse_bool(&v)) {
            config.verify_tls = verify;
        }
        if let Some(secs) = lookup("EASYREQ_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            config.timeout_secs = secs;
        }
        if let Some(max) = lookup("EASYREQ_MAX_REDIRECTS").and_then(|v| v.trim().parse().ok()) {
            config.max_redirects = max;
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_baseline() {
        let config = ClientConfig::default();
        assert!(!config.verify_tls);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.follow_redirects);
        assert_eq!(config.max_redirects, 10);
        assert!(config.auto_referer);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"verify_tls":true}"#).unwrap();
        assert!(config.verify_tls);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn env_values_overlay_defaults() {
        let config = ClientConfig::from_lookup(|key| match key {
            "EASYREQ_VERIFY_TLS" => Some("yes".to_string()),
            "EASYREQ_TIMEOUT_SECS" => Some(" 3 ".to_string()),
            _ => None,
        });
        assert!(config.verify_tls);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let config = ClientConfig::from_lookup(|key| match key {
            "EASYREQ_VERIFY_TLS" => Some("maybe".to_string()),
            "EASYREQ_MAX_REDIRECTS" => Some("-1".to_string()),
            _ => None,
        });
        assert_eq!(config, ClientConfig::default());
    }
}
