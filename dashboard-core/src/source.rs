use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::{FetchError, FetchResult},
    source::{
        coingecko::CoinGeckoSource, github::GithubSource, viacep::ViaCepSource,
        weather::WeatherSource,
    },
};

pub mod coingecko;
pub mod github;
pub mod viacep;
pub mod weather;

/// User-Agent attached to every outgoing request via the shared client.
pub const USER_AGENT: &str = "dashboard-cli";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Github,
    Weather,
    ViaCep,
    CoinGecko,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Github => "github",
            SourceId::Weather => "weather",
            SourceId::ViaCep => "viacep",
            SourceId::CoinGecko => "coingecko",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::Github, SourceId::Weather, SourceId::ViaCep, SourceId::CoinGecko]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform contract over a source adapter's canonical single-identifier
/// lookup. Every fault exits through [`FetchResult`]; adapters never
/// propagate transport or parse errors in any other shape.
#[async_trait]
pub trait Fetch: Send + Sync + Debug {
    type Query: Send + Sync;
    type Payload: Send;

    fn id(&self) -> SourceId;

    async fn fetch(&self, query: &Self::Query) -> FetchResult<Self::Payload>;
}

/// All four source adapters over one shared HTTP client.
///
/// Cloning an adapter clones the `reqwest::Client` handle, so every
/// concurrent task draws from the same connection pool.
#[derive(Debug, Clone)]
pub struct Sources {
    pub github: GithubSource,
    pub weather: WeatherSource,
    pub viacep: ViaCepSource,
    pub coingecko: CoinGeckoSource,
}

impl Sources {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            github: GithubSource::new(http.clone(), config.credential(SourceId::Github)),
            weather: WeatherSource::new(http.clone(), config.credential(SourceId::Weather)),
            viacep: ViaCepSource::new(http.clone()),
            coingecko: CoinGeckoSource::new(http),
        })
    }
}

/// Reject identifiers that are empty after trimming, before any request
/// is built.
pub(crate) fn require_identifier<'a>(value: &'a str, what: &str) -> FetchResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FetchError::invalid_input(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_distinct_strings() {
        let mut seen = std::collections::HashSet::new();
        for id in SourceId::all() {
            assert!(seen.insert(id.as_str()));
        }
    }

    #[test]
    fn blank_identifiers_are_rejected_before_any_request() {
        let err = require_identifier("   ", "username").unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));

        assert_eq!(require_identifier("  octocat ", "username").unwrap(), "octocat");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
