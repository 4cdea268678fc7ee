use anyhow::Result;
use bytes::Bytes;
use feedstash::{config::Config, response::InvocationResponse, trigger};
use std::{collections::HashMap, env, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use warp::{http::StatusCode, reject::Rejection, reply::Reply, Filter};

fn reply(resp: InvocationResponse) -> impl Reply {
    let code = StatusCode::from_u16(resp.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    warp::reply::with_status(warp::reply::json(&resp), code)
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "feedstash"
    })))
}

async fn vehicle_location(
    query: HashMap<String, String>,
    body: Bytes,
    config: Arc<Config>,
) -> Result<impl Reply, Rejection> {
    let data = trigger::data_argument(query.get("data").map(String::as_str), &body);
    let resp = trigger::vehicle_location(&config, data).await;
    Ok(reply(resp))
}

async fn weather(config: Arc<Config>) -> Result<impl Reply, Rejection> {
    Ok(reply(trigger::weather(&config).await))
}

fn routes(
    config: Arc<Config>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_config = warp::any().map(move || config.clone());

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let vehicle = warp::path("vehicle-location")
        .and(warp::path::end())
        .and(warp::get().or(warp::post()).unify())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::body::bytes())
        .and(with_config.clone())
        .and_then(vehicle_location);

    let weather_route = warp::path("weather")
        .and(warp::path::end())
        .and(warp::get().or(warp::post()).unify())
        .and(with_config)
        .and_then(weather);

    health.or(vehicle).or(weather_route)
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    info!(store = %config.store.url, weather = config.weather.is_some(), "starting feedstash service");

    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    info!("Server starting on port {}", port);
    warp::serve(routes(config)).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
