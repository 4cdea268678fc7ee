// src/fetch/weather.rs

use futures::future::join_all;
use serde::Deserialize;
use serde_json::Number;
use tracing::{info, warn};

use super::{parse_source_url, SourceClient};
use crate::config::{City, WeatherConfig};
use crate::error::Error;

/// The part of a current-weather payload that gets persisted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WeatherReport {
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub visibility: Number,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: Number,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MainReadings {
    pub temp: Number,
    pub feels_like: Number,
    pub pressure: Number,
    pub humidity: Number,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Wind {
    pub speed: Number,
    pub deg: Number,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Clouds {
    pub all: Number,
}

impl WeatherReport {
    /// The primary condition; decoding guarantees there is one.
    pub fn primary(&self) -> &Condition {
        &self.weather[0]
    }
}

/// `<base>?lat=<lat>&lon=<lon>&appid=<key>&units=metric`
pub fn city_url(api_url: &str, api_key: &str, city: &City) -> Result<String, Error> {
    let mut url = parse_source_url(api_url)?;
    url.query_pairs_mut()
        .append_pair("lat", &city.lat.to_string())
        .append_pair("lon", &city.lon.to_string())
        .append_pair("appid", api_key)
        .append_pair("units", "metric");
    Ok(url.to_string())
}

pub fn decode_report(url: &str, body: &[u8]) -> Result<WeatherReport, Error> {
    let report: WeatherReport =
        serde_json::from_slice(body).map_err(|e| Error::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if report.weather.is_empty() {
        return Err(Error::MalformedResponse {
            url: url.to_string(),
            reason: "empty weather section".to_string(),
        });
    }
    Ok(report)
}

/// Fetch one city. A non-200 answer yields `None` so the remaining cities
/// still get collected; transport faults propagate.
pub async fn fetch_city(
    client: &SourceClient,
    config: &WeatherConfig,
    city: &City,
) -> Result<Option<WeatherReport>, Error> {
    let url = city_url(&config.api_url, &config.api_key, city)?;
    // keep the api key out of logs and error messages
    let (status, body) = client
        .get_bytes(&url)
        .await
        .map_err(|e| e.with_url(&config.api_url))?;

    if status != reqwest::StatusCode::OK {
        warn!(city = %city.name, %status, "no weather data for city");
        return Ok(None);
    }

    let report = decode_report(&config.api_url, &body)?;
    info!(city = %city.name, "weather fetched");
    Ok(Some(report))
}

/// Fetch every configured city concurrently. The result is in configured
/// city order regardless of completion order.
pub async fn fetch_all(
    client: &SourceClient,
    config: &WeatherConfig,
) -> Result<Vec<(City, Option<WeatherReport>)>, Error> {
    let results = join_all(
        config
            .cities
            .iter()
            .map(|city| fetch_city(client, config, city)),
    )
    .await;

    config
        .cities
        .iter()
        .cloned()
        .zip(results)
        .map(|(city, res)| res.map(|report| (city, report)))
        .collect()
}
