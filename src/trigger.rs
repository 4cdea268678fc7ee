// src/trigger.rs
//
// One invocation per call: build the pipeline from the configuration, run
// it once and reduce the result to the outbound response.

use serde::Deserialize;
use tracing::{error, info};

use crate::config::Config;
use crate::pipeline::{vehicle::VehiclePipeline, weather::WeatherPipeline, FeedRequest};
use crate::response::InvocationResponse;

#[derive(Deserialize)]
struct DataBody {
    data: Option<String>,
}

/// The vehicle feed URL: the `data` query parameter wins over a `data`
/// field in a JSON body. A body that is not JSON is ignored.
pub fn data_argument(query: Option<&str>, body: &[u8]) -> Option<String> {
    if let Some(data) = query.filter(|q| !q.is_empty()) {
        return Some(data.to_string());
    }
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<DataBody>(body)
        .ok()
        .and_then(|b| b.data)
}

pub async fn vehicle_location(config: &Config, data_url: Option<String>) -> InvocationResponse {
    let Some(url) = data_url.filter(|u| !u.trim().is_empty()) else {
        info!("vehicle trigger called without a data url");
        return InvocationResponse::missing_data_argument();
    };

    let pipeline = match VehiclePipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %format!("{:#}", e), "vehicle pipeline setup failed");
            return InvocationResponse::setup_failed(format!("{:#}", e)).with_api_url(Some(url));
        }
    };

    let request = FeedRequest::new(url.clone());
    info!(url = %url, at = %request.request_time(), "received vehicle request");
    let outcome = pipeline.run(&request).await;
    InvocationResponse::from_outcome(&outcome).with_api_url(Some(url))
}

pub async fn weather(config: &Config) -> InvocationResponse {
    let pipeline = match WeatherPipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %format!("{:#}", e), "weather pipeline setup failed");
            return InvocationResponse::setup_failed(format!("{:#}", e));
        }
    };

    let request = pipeline.request();
    info!(at = %request.request_time(), "received weather request");
    let outcome = pipeline.run(&request).await;
    InvocationResponse::from_outcome(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_cities, StoreConfig, WeatherConfig};
    use crate::response::{ResponseStatus, MISSING_DATA_MESSAGE, SUCCESS_MESSAGE};
    use crate::testing::{self, WEATHER_SAMPLE};
    use serde_json::json;
    use std::{collections::HashMap, time::Duration};
    use warp::Filter;

    fn memory_config() -> Config {
        Config {
            store: StoreConfig {
                url: "memory:///".to_string(),
                options: HashMap::new(),
            },
            weather: None,
            request_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_data_argument_precedence() {
        let body = br#"{"data": "https://body.example.com"}"#;
        assert_eq!(
            data_argument(Some("https://query.example.com"), body).as_deref(),
            Some("https://query.example.com")
        );
        assert_eq!(
            data_argument(None, body).as_deref(),
            Some("https://body.example.com")
        );
        assert_eq!(
            data_argument(Some(""), body).as_deref(),
            Some("https://body.example.com")
        );
        assert_eq!(data_argument(None, b"not json"), None);
        assert_eq!(data_argument(None, br#"{"other": 1}"#), None);
        assert_eq!(data_argument(None, b""), None);
    }

    #[tokio::test]
    async fn test_vehicle_success_response() {
        testing::init_logging();
        let route = warp::path("feed").map(|| {
            warp::reply::json(&json!({
                "success": true,
                "result": {"records": [{"id": "1", "lat": "50.1"}]}
            }))
        });
        let addr = testing::spawn_server(route);
        let url = format!("http://{}/feed", addr);

        let resp = vehicle_location(&memory_config(), Some(url.clone())).await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.status, ResponseStatus::Success);
        assert_eq!(resp.message, SUCCESS_MESSAGE);
        assert_eq!(resp.api_url.as_deref(), Some(url.as_str()));
        let name = resp.new_file_name.unwrap();
        assert!(name.starts_with("vehicle_location_") && name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_vehicle_unsuccessful_feed_response() {
        let route = warp::path("feed").map(|| warp::reply::json(&json!({"success": false})));
        let addr = testing::spawn_server(route);

        let resp = vehicle_location(&memory_config(), Some(format!("http://{}/feed", addr))).await;
        assert_eq!(resp.status_code(), 400);
        assert_eq!(resp.status, ResponseStatus::Error);
        assert_eq!(resp.message, "unknown error");
    }

    #[tokio::test]
    async fn test_vehicle_missing_data_argument() {
        for data in [None, Some("  ".to_string())] {
            let resp = vehicle_location(&memory_config(), data).await;
            assert_eq!(resp.status, ResponseStatus::Failed);
            assert_eq!(resp.message, MISSING_DATA_MESSAGE);
            assert_eq!(resp.status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_vehicle_bad_address_message() {
        let resp = vehicle_location(&memory_config(), Some("transit/feed".to_string())).await;
        assert_eq!(resp.status, ResponseStatus::Failed);
        assert!(resp.message.contains("transit/feed is not a valid source address"));
    }

    #[tokio::test]
    async fn test_weather_requires_configuration() {
        let resp = weather(&memory_config()).await;
        assert_eq!(resp.status, ResponseStatus::Failed);
        assert_eq!(resp.message, "Configuration error");
        assert!(resp.error.unwrap().contains("OPEN_WEATHER_API_KEY"));
    }

    #[tokio::test]
    async fn test_weather_success_response() {
        let route = warp::path("weather").map(|| {
            warp::reply::with_header(WEATHER_SAMPLE, "content-type", "application/json")
        });
        let addr = testing::spawn_server(route);
        let mut config = memory_config();
        config.weather = Some(WeatherConfig {
            api_url: format!("http://{}/weather", addr),
            api_key: "k".to_string(),
            cities: default_cities(),
        });

        let resp = weather(&config).await;
        assert_eq!(resp.status_code(), 200);
        assert!(resp.new_file_name.unwrap().starts_with("weather_"));
        assert!(resp.api_url.is_none());
    }
}
