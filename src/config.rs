// src/config.rs

use anyhow::{anyhow, bail, Context, Result};
use std::{collections::HashMap, env, time::Duration};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A city whose current weather is collected on every weather run.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
        }
    }
}

static DEFAULT_CITIES: &[(&str, f64, f64)] = &[
    ("Wrocław", 51.107229588972274, 17.03649484873202),
    ("Poznań", 52.40679153622946, 16.923980849540058),
    ("Gdańsk", 54.352603073028355, 18.644018240738358),
    ("Katowice", 50.26547260052914, 19.02161122578667),
    ("Kraków", 50.06475601737979, 19.93963764829647),
    ("Warszawa", 52.22906962953621, 21.02891789167521),
];

pub fn default_cities() -> Vec<City> {
    DEFAULT_CITIES
        .iter()
        .map(|&(name, lat, lon)| City::new(name, lat, lon))
        .collect()
}

/// Where blobs live: an `object_store` URL plus the options handed to
/// `object_store::parse_url_opts`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub url: String,
    pub options: HashMap<String, String>,
}

impl StoreConfig {
    /// Build from an Azure storage connection string and a container name.
    pub fn from_azure(connection_string: &str, container: &str) -> Result<Self> {
        if container.trim().is_empty() {
            bail!("container name is empty");
        }

        let mut options = HashMap::new();
        for part in connection_string.split(';').filter(|p| !p.trim().is_empty()) {
            // values (account keys, SAS tokens) may themselves contain '='
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| anyhow!("connection string segment without '=': {}", part))?;
            let option = match key.trim() {
                "AccountName" => "azure_storage_account_name",
                "AccountKey" => "azure_storage_account_key",
                "SharedAccessSignature" => "azure_storage_sas_key",
                "UseDevelopmentStorage" => "azure_storage_use_emulator",
                // DefaultEndpointsProtocol, EndpointSuffix, BlobEndpoint, ...
                _ => continue,
            };
            options.insert(option.to_string(), value.trim().to_string());
        }

        if !options.contains_key("azure_storage_account_name")
            && !options.contains_key("azure_storage_use_emulator")
        {
            bail!("connection string has no AccountName");
        }

        Ok(Self {
            url: format!("az://{}", container.trim()),
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub api_url: String,
    pub api_key: String,
    pub cities: Vec<City>,
}

/// Everything a pipeline run needs, resolved once at process entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    /// `None` when the weather API settings are absent.
    pub weather: Option<WeatherConfig>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("BLOB_STORE_URL") {
            Some(url) => StoreConfig {
                url,
                options: HashMap::new(),
            },
            None => {
                let conn = get("AZURE_BLOB_CONNECTION_STRING")
                    .context("AZURE_BLOB_CONNECTION_STRING is not set")?;
                let container = get("AZURE_BLOB_CONTAINER_NAME")
                    .context("AZURE_BLOB_CONTAINER_NAME is not set")?;
                StoreConfig::from_azure(&conn, &container)
                    .context("parsing AZURE_BLOB_CONNECTION_STRING")?
            }
        };

        let weather = match (get("OPEN_WEATHER_API_URL"), get("OPEN_WEATHER_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(WeatherConfig {
                api_url,
                api_key,
                cities: default_cities(),
            }),
            _ => None,
        };

        let request_timeout = match get("FEED_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("FEED_REQUEST_TIMEOUT_SECS={} is not a number", raw))?,
            ),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            store,
            weather,
            request_timeout,
        })
    }

    /// The weather settings, or an error naming what is missing.
    pub fn weather(&self) -> Result<&WeatherConfig> {
        self.weather
            .as_ref()
            .context("OPEN_WEATHER_API_URL and OPEN_WEATHER_API_KEY must both be set")
    }
}
