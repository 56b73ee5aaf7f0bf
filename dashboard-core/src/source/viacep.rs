use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{FetchError, FetchResult},
    model::AddressInfo,
    source::{Fetch, SourceId, truncate_body},
};

const BASE_URL: &str = "https://viacep.com.br/ws";

/// Source adapter for ViaCEP, the Brazilian postal-code directory.
///
/// Input is validated structurally before any request is built: all
/// non-digit characters are stripped and exactly 8 digits must remain.
#[derive(Debug, Clone)]
pub struct ViaCepSource {
    http: Client,
    base_url: String,
}

impl ViaCepSource {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: BASE_URL.to_string() }
    }

    /// Point the adapter at a different base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve an 8-digit CEP to an address.
    pub async fn lookup(&self, cep: &str) -> FetchResult<AddressInfo> {
        let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 8 {
            return Err(FetchError::invalid_input(format!(
                "CEP must have 8 digits: {cep:?}"
            )));
        }

        debug!(cep = %digits, "looking up CEP");
        let res = self.http.get(format!("{}/{}/json", self.base_url, digits)).send().await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "ViaCEP request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        // A 2xx body carrying the `erro` sentinel means the CEP does not exist.
        let value: Value = serde_json::from_str(&body)?;
        if is_error_sentinel(&value) {
            return Err(FetchError::not_found("CEP", digits));
        }

        let parsed: CepResponse = serde_json::from_value(value)?;
        Ok(AddressInfo {
            cep: presence(parsed.cep).unwrap_or(digits),
            street: presence(parsed.logradouro),
            complement: presence(parsed.complemento),
            neighborhood: presence(parsed.bairro),
            city: presence(parsed.localidade),
            state: presence(parsed.uf),
            ibge: presence(parsed.ibge),
            ddd: presence(parsed.ddd),
        })
    }
}

/// ViaCEP has signalled "not found" both as `"erro": true` and as
/// `"erro": "true"` over the years; accept either.
fn is_error_sentinel(value: &Value) -> bool {
    value
        .get("erro")
        .is_some_and(|v| v.as_bool() == Some(true) || v.as_str() == Some("true"))
}

/// Empty-string upstream fields normalize to the unknown marker.
fn presence(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct CepResponse {
    cep: Option<String>,
    logradouro: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    ibge: Option<String>,
    ddd: Option<String>,
}

#[async_trait]
impl Fetch for ViaCepSource {
    type Query = String;
    type Payload = AddressInfo;

    fn id(&self) -> SourceId {
        SourceId::ViaCep
    }

    async fn fetch(&self, query: &Self::Query) -> FetchResult<Self::Payload> {
        self.lookup(query).await
    }
}
