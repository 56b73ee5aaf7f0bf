use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized GitHub user profile.
///
/// Fields the upstream may omit are `Option`s; `None` means "unavailable",
/// which presentation code renders differently from zero or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub public_repos: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// One repository row from a user's recent-repositories listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub forks: Option<u64>,
    pub url: Option<String>,
}

/// Current weather for one city, normalized from OpenWeatherMap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub city: String,
    pub country: Option<String>,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<u64>,
    pub pressure_hpa: Option<u64>,
    pub description: Option<String>,
    /// Glyph mapped from the upstream icon code; a thermometer when unknown.
    pub icon: String,
    pub wind_speed_mps: Option<f64>,
    pub clouds_pct: Option<u64>,
}

/// Brazilian address resolved from an 8-digit CEP.
///
/// ViaCEP reports absent fields as empty strings; those normalize to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub cep: String,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub ibge: Option<String>,
    pub ddd: Option<String>,
}

/// Spot price of one coin in one reference currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub coin: String,
    /// Reference currency, upper-cased (e.g. "BRL").
    pub currency: String,
    pub price: Option<f64>,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Detailed coin information from the per-coin endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDetail {
    pub id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    /// Portuguese description when present, falling back to English.
    pub description: Option<String>,
    pub image: Option<String>,
    pub market_cap_rank: Option<u64>,
    pub price_brl: Option<f64>,
    pub price_usd: Option<f64>,
    pub change_24h: Option<f64>,
    pub high_24h_brl: Option<f64>,
    pub low_24h_brl: Option<f64>,
}

/// Request value for a current-weather lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    /// ISO country code appended to the city when present (e.g. "BR").
    pub country_code: Option<String>,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), country_code: None }
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }
}

/// Request value for a single-coin price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub coin_id: String,
    /// Reference currency id, lower-cased by the adapter (default "brl").
    pub currency: String,
}

impl PriceQuery {
    pub fn new(coin_id: impl Into<String>) -> Self {
        Self { coin_id: coin_id.into(), currency: "brl".to_string() }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}
