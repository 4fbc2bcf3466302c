//! Configuration types for homework-bot
//!
//! Everything is read from the process environment exactly once, at startup.
//! The three credentials are mandatory; the remaining settings fall back to
//! the `default_*` functions at the bottom of this file.

use crate::error::{Error, Result};
use std::{fmt, str::FromStr, time::Duration};
use url::Url;

/// Environment variable holding the homework API OAuth token
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

// Older deployments used these names.
const LEGACY_PRACTICUM_TOKEN_VAR: &str = "YA_TOKEN";
const LEGACY_TELEGRAM_TOKEN_VAR: &str = "TELE_TOKEN";
const LEGACY_TELEGRAM_CHAT_ID_VAR: &str = "CHAT";

const ENDPOINT_VAR: &str = "PRACTICUM_ENDPOINT";
const TELEGRAM_API_BASE_VAR: &str = "TELEGRAM_API_BASE";
const RETRY_INTERVAL_VAR: &str = "RETRY_INTERVAL_SECS";
const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";
const DELIVERY_POLICY_VAR: &str = "DELIVERY_POLICY";

/// The three secrets the bot cannot run without
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the homework API
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// Chat that receives every notification
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// What to do when a notification cannot be delivered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Log the failure and carry on as if the message was sent
    #[default]
    Swallow,
    /// Return the failure to the poller, which reports it like any other error
    Propagate,
}

impl FromStr for DeliveryPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swallow" => Ok(DeliveryPolicy::Swallow),
            "propagate" => Ok(DeliveryPolicy::Propagate),
            other => Err(Error::config(
                DELIVERY_POLICY_VAR,
                format!("unknown delivery policy {other:?}, expected \"swallow\" or \"propagate\""),
            )),
        }
    }
}

/// Main configuration for the homework poller
#[derive(Clone, Debug)]
pub struct Config {
    /// API token, bot token and chat id
    pub credentials: Credentials,

    /// Homework statuses endpoint
    pub endpoint: String,

    /// Base URL of the Telegram Bot API (default: "https://api.telegram.org")
    pub telegram_api_base: String,

    /// Pause between polling cycles (default: 600 seconds)
    pub retry_interval: Duration,

    /// Per-request timeout for both HTTP collaborators (None = wait forever)
    pub request_timeout: Option<Duration>,

    /// Handling of failed notification sends
    pub delivery_policy: DeliveryPolicy,
}

impl Config {
    /// Build a config with default settings around the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: default_endpoint(),
            telegram_api_base: default_telegram_api_base(),
            retry_interval: default_retry_interval(),
            request_timeout: None,
            delivery_policy: DeliveryPolicy::default(),
        }
    }

    /// Load the configuration from the process environment
    ///
    /// # Errors
    /// Returns [`Error::Config`] if any credential is missing or blank, or an
    /// optional setting cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let read_with_fallback = |key: &str, legacy: &str| read(key).or_else(|| read(legacy));

        let practicum_token = read_with_fallback(PRACTICUM_TOKEN_VAR, LEGACY_PRACTICUM_TOKEN_VAR);
        let telegram_token = read_with_fallback(TELEGRAM_TOKEN_VAR, LEGACY_TELEGRAM_TOKEN_VAR);
        let telegram_chat_id =
            read_with_fallback(TELEGRAM_CHAT_ID_VAR, LEGACY_TELEGRAM_CHAT_ID_VAR);

        let credentials = match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Credentials {
                practicum_token,
                telegram_token,
                telegram_chat_id: telegram_chat_id.trim().to_string(),
            },
            (practicum_token, telegram_token, telegram_chat_id) => {
                let missing: Vec<&str> = [
                    (PRACTICUM_TOKEN_VAR, practicum_token.is_none()),
                    (TELEGRAM_TOKEN_VAR, telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID_VAR, telegram_chat_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();

                return Err(Error::Config {
                    message: format!("required environment variables not set: {}", missing.join(", ")),
                    key: missing.first().map(|key| key.to_string()),
                });
            }
        };

        let mut config = Config::new(credentials);

        if let Some(endpoint) = read(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        if let Some(base) = read(TELEGRAM_API_BASE_VAR) {
            config.telegram_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = read(RETRY_INTERVAL_VAR) {
            config.retry_interval = parse_secs(RETRY_INTERVAL_VAR, &secs)?;
        }
        if let Some(secs) = read(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Some(parse_secs(REQUEST_TIMEOUT_VAR, &secs)?);
        }
        if let Some(policy) = read(DELIVERY_POLICY_VAR) {
            config.delivery_policy = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that both URLs parse and the durations are usable
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.endpoint).map_err(|e| {
            Error::config(ENDPOINT_VAR, format!("invalid endpoint {:?}: {e}", self.endpoint))
        })?;
        Url::parse(&self.telegram_api_base).map_err(|e| {
            Error::config(
                TELEGRAM_API_BASE_VAR,
                format!("invalid Telegram API base {:?}: {e}", self.telegram_api_base),
            )
        })?;
        if self.retry_interval.is_zero() {
            return Err(Error::config(RETRY_INTERVAL_VAR, "retry interval must be positive"));
        }
        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::config(REQUEST_TIMEOUT_VAR, "request timeout must be positive"));
        }
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::config(key, format!("{key} must be a whole number of seconds: {e}")))
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (PRACTICUM_TOKEN_VAR, "practicum-secret"),
            (TELEGRAM_TOKEN_VAR, "123:telegram-secret"),
            (TELEGRAM_CHAT_ID_VAR, "42"),
        ]
    }

    #[test]
    fn loads_credentials_with_defaults() {
        let config = Config::from_lookup(lookup(&required())).unwrap();

        assert_eq!(config.credentials.practicum_token, "practicum-secret");
        assert_eq!(config.credentials.telegram_token, "123:telegram-secret");
        assert_eq!(config.credentials.telegram_chat_id, "42");
        assert_eq!(
            config.endpoint,
            "https://practicum.yandex.ru/api/user_api/homework_statuses/"
        );
        assert_eq!(config.telegram_api_base, "https://api.telegram.org");
        assert_eq!(config.retry_interval, Duration::from_secs(600));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.delivery_policy, DeliveryPolicy::Swallow);
    }

    #[test]
    fn missing_credentials_are_all_named() {
        let err = Config::from_lookup(lookup(&[(TELEGRAM_TOKEN_VAR, "t")])).unwrap_err();

        match err {
            Error::Config { message, key } => {
                assert!(message.contains(PRACTICUM_TOKEN_VAR), "got: {message}");
                assert!(message.contains(TELEGRAM_CHAT_ID_VAR), "got: {message}");
                assert!(!message.contains(TELEGRAM_TOKEN_VAR), "got: {message}");
                assert_eq!(key.as_deref(), Some(PRACTICUM_TOKEN_VAR));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let mut vars = required();
        vars[2] = (TELEGRAM_CHAT_ID_VAR, "   ");

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err.error_code(), "config_error");
    }

    #[test]
    fn legacy_variable_names_are_accepted() {
        let config = Config::from_lookup(lookup(&[
            ("YA_TOKEN", "a"),
            ("TELE_TOKEN", "b"),
            ("CHAT", "c"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.practicum_token, "a");
        assert_eq!(config.credentials.telegram_token, "b");
        assert_eq!(config.credentials.telegram_chat_id, "c");
    }

    #[test]
    fn optional_settings_override_defaults() {
        let mut vars = required();
        vars.extend([
            (ENDPOINT_VAR, "http://localhost:8080/statuses/"),
            (TELEGRAM_API_BASE_VAR, "http://localhost:9090/"),
            (RETRY_INTERVAL_VAR, "30"),
            (REQUEST_TIMEOUT_VAR, "5"),
            (DELIVERY_POLICY_VAR, "Propagate"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.endpoint, "http://localhost:8080/statuses/");
        assert_eq!(config.telegram_api_base, "http://localhost:9090");
        assert_eq!(config.retry_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.delivery_policy, DeliveryPolicy::Propagate);
    }

    #[test]
    fn malformed_optional_settings_name_their_key() {
        for (key, value) in [
            (RETRY_INTERVAL_VAR, "ten minutes"),
            (RETRY_INTERVAL_VAR, "0"),
            (REQUEST_TIMEOUT_VAR, "-1"),
            (REQUEST_TIMEOUT_VAR, "0"),
            (DELIVERY_POLICY_VAR, "ignore"),
            (ENDPOINT_VAR, "not a url"),
        ] {
            let mut vars = required();
            vars.push((key, value));

            match Config::from_lookup(lookup(&vars)) {
                Err(Error::Config { key: Some(k), .. }) => assert_eq!(k, key),
                other => panic!("{key}={value:?} should fail with a config error, got {other:?}"),
            }
        }
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let config = Config::from_lookup(lookup(&required())).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("practicum-secret"), "got: {rendered}");
        assert!(!rendered.contains("telegram-secret"), "got: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }
}
