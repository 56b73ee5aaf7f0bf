use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::OPENWEATHER_KEY_ENV,
    error::{FetchError, FetchResult},
    model::{WeatherInfo, WeatherQuery},
    source::{Fetch, SourceId, require_identifier, truncate_body},
};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Upstream icon codes mapped to terminal glyphs.
const ICON_GLYPHS: &[(&str, &str)] = &[
    ("01d", "☀️"),
    ("01n", "🌙"),
    ("02d", "⛅"),
    ("02n", "☁️"),
    ("03d", "☁️"),
    ("03n", "☁️"),
    ("04d", "☁️"),
    ("04n", "☁️"),
    ("09d", "🌧️"),
    ("09n", "🌧️"),
    ("10d", "🌦️"),
    ("10n", "🌧️"),
    ("11d", "⛈️"),
    ("11n", "⛈️"),
    ("13d", "❄️"),
    ("13n", "❄️"),
    ("50d", "🌫️"),
    ("50n", "🌫️"),
];

const FALLBACK_GLYPH: &str = "🌡️";

/// Source adapter for OpenWeatherMap's current-weather endpoint.
///
/// Requires an API key; when absent, [`WeatherSource::current`]
/// short-circuits before any network I/O.
#[derive(Debug, Clone)]
pub struct WeatherSource {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherSource {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self { http, api_key, base_url: BASE_URL.to_string() }
    }

    /// Point the adapter at a different base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether an API key is available. The interactive menu checks this
    /// up front to warn instead of prompting for a city.
    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the current weather for a city, optionally narrowed by
    /// country code.
    pub async fn current(&self, query: &WeatherQuery) -> FetchResult<WeatherInfo> {
        let city = require_identifier(&query.city, "city")?;

        let Some(api_key) = &self.api_key else {
            return Err(FetchError::not_configured(OPENWEATHER_KEY_ENV));
        };

        let location = match &query.country_code {
            Some(country) => format!("{city},{country}"),
            None => city.to_string(),
        };

        debug!(%location, "fetching current weather");
        let res = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", location.as_str()),
                ("appid", api_key.as_str()),
                ("units", "metric"),
                ("lang", "pt_br"),
            ])
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found("city", city));
        }

        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "OpenWeatherMap request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: OwResponse = serde_json::from_str(&body)?;

        let condition = parsed.weather.into_iter().next();
        let icon = condition
            .as_ref()
            .and_then(|w| w.icon.as_deref())
            .map_or(FALLBACK_GLYPH, icon_glyph);

        Ok(WeatherInfo {
            city: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            description: condition.and_then(|w| w.description),
            icon: icon.to_string(),
            wind_speed_mps: parsed.wind.speed,
            clouds_pct: parsed.clouds.all,
        })
    }
}

fn icon_glyph(code: &str) -> &'static str {
    ICON_GLYPHS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map_or(FALLBACK_GLYPH, |(_, glyph)| glyph)
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<u64>,
    pressure: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: Option<u64>,
}

#[async_trait]
impl Fetch for WeatherSource {
    type Query = WeatherQuery;
    type Payload = WeatherInfo;

    fn id(&self) -> SourceId {
        SourceId::Weather
    }

    async fn fetch(&self, query: &Self::Query) -> FetchResult<Self::Payload> {
        self.current(query).await
    }
}
