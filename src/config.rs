use crate::context::state::ApplicationStateView;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROUTE: &str = "/playground";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Settings for the terminal front-end, read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub route: String,
    pub state_file: Option<PathBuf>,
}

impl AssistantConfig {
    /// Reads `ASSISTANT_ENDPOINT` (required), `ASSISTANT_ACCESS_TOKEN`,
    /// `ASSISTANT_ROUTE` and `ASSISTANT_STATE_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint =
            non_empty("ASSISTANT_ENDPOINT").ok_or(ConfigError::Missing("ASSISTANT_ENDPOINT"))?;

        Ok(Self {
            endpoint,
            access_token: non_empty("ASSISTANT_ACCESS_TOKEN"),
            route: non_empty("ASSISTANT_ROUTE").unwrap_or_else(|| DEFAULT_ROUTE.to_string()),
            state_file: non_empty("ASSISTANT_STATE_FILE").map(PathBuf::from),
        })
    }
}

/// Loads an application state snapshot from a JSON file.
pub async fn load_state(path: &Path) -> anyhow::Result<ApplicationStateView> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn endpoint_is_required() {
        let err = AssistantConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ASSISTANT_ENDPOINT"));
        assert_eq!(err.to_string(), "ASSISTANT_ENDPOINT is not set");

        let blank = AssistantConfig::from_lookup(lookup(&[("ASSISTANT_ENDPOINT", " ")]));
        assert_eq!(blank, Err(ConfigError::Missing("ASSISTANT_ENDPOINT")));
    }

    #[test]
    fn defaults_apply() {
        let config =
            AssistantConfig::from_lookup(lookup(&[("ASSISTANT_ENDPOINT", "http://x/assistant")]))
                .unwrap();
        assert_eq!(config.route, DEFAULT_ROUTE);
        assert_eq!(config.access_token, None);
        assert_eq!(config.state_file, None);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = AssistantConfig::from_lookup(lookup(&[
            ("ASSISTANT_ENDPOINT", "http://x"),
            ("ASSISTANT_ACCESS_TOKEN", "  "),
            ("ASSISTANT_ROUTE", "/courses/2/grading"),
        ]))
        .unwrap();
        assert_eq!(config.access_token, None);
        assert_eq!(config.route, "/courses/2/grading");
    }
}
