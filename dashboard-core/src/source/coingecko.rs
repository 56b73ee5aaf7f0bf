use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{FetchError, FetchResult},
    model::{PriceDetail, PriceInfo, PriceQuery},
    source::{Fetch, SourceId, require_identifier, truncate_body},
};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Fixed set of well-known coin ids fetched by the popular-coins batch.
pub const POPULAR_COINS: [&str; 8] =
    ["bitcoin", "ethereum", "binancecoin", "cardano", "solana", "ripple", "polkadot", "dogecoin"];

/// Source adapter for the CoinGecko API: spot prices, a one-request
/// popular-coins batch, and per-coin details. No credential required.
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    http: Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: BASE_URL.to_string() }
    }

    /// Point the adapter at a different base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the spot price of one coin in one reference currency.
    pub async fn price(&self, query: &PriceQuery) -> FetchResult<PriceInfo> {
        let coin = require_identifier(&query.coin_id, "coin id")?;
        let currency = query.currency.trim().to_lowercase();
        if currency.is_empty() {
            return Err(FetchError::invalid_input("currency must not be empty"));
        }

        debug!(coin, %currency, "fetching coin price");
        let res = self
            .http
            .get(format!("{}/simple/price", self.base_url))
            .query(&[
                ("ids", coin),
                ("vs_currencies", currency.as_str()),
                ("include_24hr_change", "true"),
                ("include_market_cap", "true"),
            ])
            .send()
            .await?;

        let value = self.read_price_body(res).await?;
        let Some(entry) = value.get(coin) else {
            return Err(FetchError::not_found("coin", coin));
        };

        Ok(price_from_entry(coin, &currency, entry, true))
    }

    /// Fetch all [`POPULAR_COINS`] in one upstream request.
    ///
    /// The breakdown follows the fixed list's order; a coin missing from
    /// the upstream response occupies its slot as a not-found error rather
    /// than being silently dropped.
    pub async fn popular(&self, currency: &str) -> FetchResult<Vec<FetchResult<PriceInfo>>> {
        let currency = currency.trim().to_lowercase();
        if currency.is_empty() {
            return Err(FetchError::invalid_input("currency must not be empty"));
        }

        debug!(%currency, "fetching popular coin prices");
        let res = self
            .http
            .get(format!("{}/simple/price", self.base_url))
            .query(&[
                ("ids", POPULAR_COINS.join(",").as_str()),
                ("vs_currencies", currency.as_str()),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;

        let value = self.read_price_body(res).await?;

        Ok(POPULAR_COINS
            .iter()
            .map(|coin| match value.get(coin) {
                Some(entry) => Ok(price_from_entry(coin, &currency, entry, false)),
                None => Err(FetchError::not_found("coin", *coin)),
            })
            .collect())
    }

    /// Fetch detailed information for one coin.
    pub async fn coin_detail(&self, coin_id: &str) -> FetchResult<PriceDetail> {
        let coin = require_identifier(coin_id, "coin id")?;

        debug!(coin, "fetching coin detail");
        let res = self
            .http
            .get(format!("{}/coins/{}", self.base_url, coin))
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ])
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found("coin", coin));
        }

        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "CoinGecko coin request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: CgCoin = serde_json::from_str(&body)?;
        let market = parsed.market_data.unwrap_or_default();

        let description = parsed.description.as_ref().and_then(|d| {
            // Prefer the Portuguese description, falling back to English;
            // empty strings count as absent.
            locale(&d.pt).or_else(|| locale(&d.en))
        });

        Ok(PriceDetail {
            id: parsed.id,
            symbol: parsed.symbol.map(|s| s.to_uppercase()),
            name: parsed.name,
            description,
            image: parsed.image.and_then(|i| i.small),
            market_cap_rank: parsed.market_cap_rank,
            price_brl: currency_of(&market.current_price, "brl"),
            price_usd: currency_of(&market.current_price, "usd"),
            change_24h: market.price_change_percentage_24h,
            high_24h_brl: currency_of(&market.high_24h, "brl"),
            low_24h_brl: currency_of(&market.low_24h, "brl"),
        })
    }

    async fn read_price_body(&self, res: reqwest::Response) -> FetchResult<Value> {
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "CoinGecko price request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Project one per-coin object from the simple-price response. The keys
/// are dynamic (`{currency}`, `{currency}_24h_change`, ...), so this reads
/// through `Value` with missing keys mapping to the unknown marker.
fn price_from_entry(coin: &str, currency: &str, entry: &Value, with_market_cap: bool) -> PriceInfo {
    PriceInfo {
        coin: coin.to_string(),
        currency: currency.to_uppercase(),
        price: number(entry, currency),
        change_24h: number(entry, &format!("{currency}_24h_change")),
        market_cap: with_market_cap
            .then(|| number(entry, &format!("{currency}_market_cap")))
            .flatten(),
    }
}

fn number(entry: &Value, key: &str) -> Option<f64> {
    entry.get(key).and_then(Value::as_f64)
}

fn currency_of(map: &Option<Value>, currency: &str) -> Option<f64> {
    map.as_ref().and_then(|m| number(m, currency))
}

fn locale(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

#[derive(Debug, Deserialize)]
struct CgCoin {
    id: String,
    symbol: Option<String>,
    name: Option<String>,
    description: Option<CgDescription>,
    image: Option<CgImage>,
    market_cap_rank: Option<u64>,
    market_data: Option<CgMarketData>,
}

#[derive(Debug, Deserialize)]
struct CgDescription {
    pt: Option<String>,
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CgImage {
    small: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CgMarketData {
    current_price: Option<Value>,
    price_change_percentage_24h: Option<f64>,
    high_24h: Option<Value>,
    low_24h: Option<Value>,
}

#[async_trait]
impl Fetch for CoinGeckoSource {
    type Query = PriceQuery;
    type Payload = PriceInfo;

    fn id(&self) -> SourceId {
        SourceId::CoinGecko
    }

    async fn fetch(&self, query: &Self::Query) -> FetchResult<Self::Payload> {
        self.price(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> CoinGeckoSource {
        CoinGeckoSource::new(Client::new()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn price_maps_dynamic_currency_keys() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "brl"))
            .and(query_param("include_24hr_change", "true"))
            .and(query_param("include_market_cap", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bitcoin": {
                    "brl": 350000.0,
                    "brl_24h_change": 2.5,
                    "brl_market_cap": 6.9e12
                }
            })))
            .mount(&server)
            .await;

        let price = source(&server)
            .price(&PriceQuery::new("bitcoin").with_currency("brl"))
            .await
            .unwrap();

        assert_eq!(price.coin, "bitcoin");
        assert_eq!(price.currency, "BRL");
        assert_eq!(price.price, Some(350000.0));
        assert_eq!(price.change_24h, Some(2.5));
        assert_eq!(price.market_cap, Some(6.9e12));
    }

    #[tokio::test]
    async fn empty_body_means_coin_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = source(&server).price(&PriceQuery::new("invalidcoin")).await.unwrap_err();
        assert_eq!(err, FetchError::not_found("coin", "invalidcoin"));
        assert_eq!(err.to_string(), "coin not found: invalidcoin");
    }

    #[tokio::test]
    async fn popular_is_one_request_ordered_by_the_fixed_list() {
        let server = MockServer::start().await;

        let mut body = serde_json::Map::new();
        for coin in POPULAR_COINS {
            body.insert(
                coin.to_string(),
                json!({ "brl": 100.0, "brl_24h_change": -1.0 }),
            );
        }

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", POPULAR_COINS.join(",")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Object(body)))
            .expect(1)
            .mount(&server)
            .await;

        let breakdown = source(&server).popular("brl").await.unwrap();

        assert_eq!(breakdown.len(), POPULAR_COINS.len());
        for (slot, coin) in breakdown.iter().zip(POPULAR_COINS) {
            assert_eq!(slot.as_ref().unwrap().coin, coin);
        }
    }

    #[tokio::test]
    async fn popular_reports_missing_coins_as_not_found() {
        // Coins absent from the upstream response are reported in their
        // slot rather than silently omitted.
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bitcoin": { "brl": 350000.0, "brl_24h_change": 2.5 }
            })))
            .mount(&server)
            .await;

        let breakdown = source(&server).popular("brl").await.unwrap();

        assert_eq!(breakdown.len(), POPULAR_COINS.len());
        assert!(breakdown[0].is_ok());
        for slot in &breakdown[1..] {
            assert!(matches!(slot, Err(FetchError::NotFound { .. })));
        }
    }

    #[tokio::test]
    async fn coin_detail_prefers_portuguese_description() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/coins/bitcoin"))
            .and(query_param("localization", "false"))
            .and(query_param("tickers", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "description": { "pt": "", "en": "Digital gold" },
                "image": { "small": "https://example.com/btc.png" },
                "market_cap_rank": 1,
                "market_data": {
                    "current_price": { "brl": 350000.0, "usd": 65000.0 },
                    "price_change_percentage_24h": 2.5,
                    "high_24h": { "brl": 360000.0 },
                    "low_24h": { "brl": 340000.0 }
                }
            })))
            .mount(&server)
            .await;

        let detail = source(&server).coin_detail("bitcoin").await.unwrap();

        assert_eq!(detail.symbol.as_deref(), Some("BTC"));
        // Empty pt falls back to en.
        assert_eq!(detail.description.as_deref(), Some("Digital gold"));
        assert_eq!(detail.price_brl, Some(350000.0));
        assert_eq!(detail.price_usd, Some(65000.0));
        assert_eq!(detail.market_cap_rank, Some(1));
    }

    #[tokio::test]
    async fn coin_detail_404_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/coins/invalidcoin"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server).coin_detail("invalidcoin").await.unwrap_err();
        assert_eq!(err, FetchError::not_found("coin", "invalidcoin"));
    }
}
