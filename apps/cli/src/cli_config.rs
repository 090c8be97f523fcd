use std::env;
use std::time::Duration;

use mapr_ticket_core::{AppError, AppResult};

const REQUEST_TIMEOUT_ENV: &str = "MAPR_TICKET_REQUEST_TIMEOUT_SECONDS";
const DEFAULT_NAMESPACE_ENV: &str = "MAPR_TICKET_DEFAULT_NAMESPACE";

/// Settings read from the environment before flags are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub request_timeout: Option<Duration>,
    pub default_namespace: String,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let timeout_seconds = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid {REQUEST_TIMEOUT_ENV} value '{value}': {error}"
                ))
            })?,
            None => 30,
        };

        let default_namespace = lookup(DEFAULT_NAMESPACE_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "default".to_owned());

        Ok(Self {
            request_timeout: (timeout_seconds > 0).then(|| Duration::from_secs(timeout_seconds)),
            default_namespace,
        })
    }

    /// Applies the `--timeout` flag, where `0` disables the deadline.
    #[must_use]
    pub fn with_timeout_override(mut self, timeout_seconds: Option<u64>) -> Self {
        if let Some(seconds) = timeout_seconds {
            self.request_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use mapr_ticket_core::AppError;

    use super::CliConfig;

    fn load(values: &[(&str, &str)]) -> Result<CliConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        CliConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let result = load(&[]);
        assert!(result.is_ok());

        let config = result.unwrap_or_else(|_| unreachable!());
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.default_namespace, "default");
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let result = load(&[("MAPR_TICKET_REQUEST_TIMEOUT_SECONDS", "0")]);
        assert!(result.is_ok());
        assert_eq!(
            result.unwrap_or_else(|_| unreachable!()).request_timeout,
            None
        );
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let result = load(&[("MAPR_TICKET_REQUEST_TIMEOUT_SECONDS", "soon")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn flag_overrides_environment_timeout() {
        let result = load(&[
            ("MAPR_TICKET_REQUEST_TIMEOUT_SECONDS", "5"),
            ("MAPR_TICKET_DEFAULT_NAMESPACE", " mapr "),
        ]);
        assert!(result.is_ok());

        let config = result
            .unwrap_or_else(|_| unreachable!())
            .with_timeout_override(Some(90));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.default_namespace, "mapr");
    }
}
