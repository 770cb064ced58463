use crate::Error;
use morph::MorphConfig;
use net::FetchConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raises scan and bind logging from `debug` to `info`.
    pub debug: bool,
    /// Run swaps through the page's [`ViewTransitions`](crate::ViewTransitions) hooks.
    pub transitions: bool,
    /// Dispatching one of these events rescans the whole document.
    pub parse_on: Vec<String>,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub morph: MorphConfig,
    /// Attributes applied at swap time instead of being held back until settle.
    pub settle_exempt: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let fetch = FetchConfig::default();
        Self {
            debug: false,
            transitions: true,
            parse_on: Vec::new(),
            base_url: "http://localhost/".to_string(),
            user_agent: fetch.user_agent,
            timeout_ms: 10_000,
            morph: MorphConfig::default(),
            settle_exempt: ["id", grammar::SWAP_ATTR, grammar::ACTION_ATTR]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn base_url(&self) -> Result<Url, Error> {
        Url::parse(&self.base_url).map_err(|source| {
            Error::Net(net::NetError::InvalidUrl {
                url: self.base_url.clone(),
                source,
            })
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            ..FetchConfig::default()
        }
    }

    pub(crate) fn scan_log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph::HeadStyle;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
debug = true
parse_on = ["refresh"]
base_url = "https://example.test/app/"

[morph]
preserved_attributes = ["data-open"]

[morph.head]
style = "append"
"#,
        )
        .expect("config");
        assert!(config.debug);
        assert!(config.transitions);
        assert_eq!(config.parse_on, vec!["refresh".to_string()]);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.morph.head.style, HeadStyle::Append);
        assert!(config.morph.ignore_active_value);
        assert_eq!(config.settle_exempt, vec!["id", "z-swap", "z-action"]);
        assert_eq!(
            config.base_url().expect("url").as_str(),
            "https://example.test/app/"
        );
        assert_eq!(config.fetch_config().timeout, Duration::from_secs(10));
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = Config::from_toml("timeout_ms = \"soon\"").expect_err("type mismatch");
        assert!(matches!(err, Error::Config(_)), "expected Config, got: {err:?}");

        let config = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.base_url(),
            Err(Error::Net(net::NetError::InvalidUrl { .. }))
        ));
    }
}
