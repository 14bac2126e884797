use std::env;
use std::time::Duration;

use url::Url;

use crate::error::AppError;

/// Query parameter of the launch URL that carries the backend address.
pub const API_URL_PARAM: &str = "apiUrl";

const DEFAULT_CONFIRMATION_DELAY_MS: u64 = 1500;

/// Backend base address. Resolved once per launch and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Reads the required `apiUrl` parameter from the launch URL.
    pub fn from_launch_url(launch_url: &str) -> Result<Self, AppError> {
        let launch = Url::parse(launch_url).map_err(|e| {
            AppError::Configuration(format!("Unable to read launch parameters: {}", e))
        })?;

        let raw = launch
            .query_pairs()
            .find(|(key, _)| key == API_URL_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Missing required launch parameter `{}`",
                    API_URL_PARAM
                ))
            })?;

        Self::parse(raw.trim())
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let base = Url::parse(raw).map_err(|e| {
            AppError::Configuration(format!("Invalid backend address `{}`: {}", raw, e))
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::Configuration(format!(
                "Backend address `{}` is not an http(s) URL",
                raw
            )));
        }
        Ok(Self { base })
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded.
    pub fn join(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration(format!("Cannot extend `{}`", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.base
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub launch_url: String,
    pub init_data: Option<String>,
    pub confirmation_delay: Duration,
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let launch_url = env::var("LAUNCH_URL")
            .map_err(|_| AppError::Configuration("LAUNCH_URL is not set".to_string()))?;
        let init_data = env::var("TMA_INIT_DATA").ok().filter(|v| !v.is_empty());
        let confirmation_delay = match env::var("CONFIRMATION_DELAY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Configuration(format!("CONFIRMATION_DELAY_MS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_CONFIRMATION_DELAY_MS,
        };

        Ok(Self {
            launch_url,
            init_data,
            confirmation_delay: Duration::from_millis(confirmation_delay),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            launch_url: String::new(),
            init_data: None,
            confirmation_delay: Duration::from_millis(DEFAULT_CONFIRMATION_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_base_address_from_query() {
        let endpoint =
            Endpoint::from_launch_url("https://app.example/?apiUrl=https%3A%2F%2Fapi.example%2Fv1")
                .expect("endpoint");
        assert_eq!(endpoint.as_url().as_str(), "https://api.example/v1");
    }

    #[test]
    fn missing_parameter_is_a_configuration_error() {
        let err = Endpoint::from_launch_url("https://app.example/?other=1").unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref msg) if msg.contains("apiUrl")));
    }

    #[test]
    fn empty_parameter_is_treated_as_missing() {
        let err = Endpoint::from_launch_url("https://app.example/?apiUrl=").unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn unparsable_launch_url_is_a_configuration_error() {
        let err = Endpoint::from_launch_url("not a url").unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref msg) if msg.starts_with("Unable")));
    }

    #[test]
    fn join_keeps_base_path_prefix() {
        let endpoint = Endpoint::parse("https://api.example/v1/").expect("endpoint");
        let url = endpoint.join(&["tasks", "42"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example/v1/tasks/42");

        let endpoint = Endpoint::parse("https://api.example/v1").expect("endpoint");
        let url = endpoint.join(&["groups"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example/v1/groups");
    }

    #[test]
    fn join_encodes_segments() {
        let endpoint = Endpoint::parse("https://api.example").expect("endpoint");
        let url = endpoint.join(&["tasks", "a/b"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example/tasks/a%2Fb");
    }
}
