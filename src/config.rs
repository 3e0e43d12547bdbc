use std::{fmt, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;
use thiserror::Error;
use url::Url;

use crate::render::ResultsStyle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set.")]
    Missing(&'static str),
    #[error("{var} can't be parsed: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("NGROK_URL and NGROK_ADDR must be set together.")]
    IncompleteWebhook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Clone)]
pub struct Settings {
    pub teloxide_token: String,
    pub question_bank: PathBuf,
    /// `EnvFilter` directives, e.g. `info,teloxide=warn`.
    pub log_level: String,
    pub results_style: ResultsStyle,
    /// Webhook mode when present, long polling otherwise.
    pub webhook: Option<Webhook>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("teloxide_token", &"[redacted]")
            .field("question_bank", &self.question_bank)
            .field("log_level", &self.log_level)
            .field("results_style", &self.results_style)
            .field("webhook", &self.webhook)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let teloxide_token = get("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;
        let question_bank = get("QUESTION_BANK")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tests.json"));
        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_owned());
        let results_style = match get("RESULTS_STYLE") {
            Some(style) => style.parse().map_err(|e: crate::render::UnknownResultsStyle| {
                ConfigError::Invalid {
                    var: "RESULTS_STYLE",
                    reason: e.to_string(),
                }
            })?,
            None => ResultsStyle::default(),
        };

        let webhook = match (get("NGROK_URL"), get("NGROK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: url.parse().map_err(|e: url::ParseError| ConfigError::Invalid {
                    var: "NGROK_URL",
                    reason: e.to_string(),
                })?,
                addr: addr
                    .parse()
                    .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                        var: "NGROK_ADDR",
                        reason: e.to_string(),
                    })?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteWebhook),
        };

        Ok(Self {
            teloxide_token,
            question_bank,
            log_level,
            results_style,
            webhook,
        })
    }
}
