// src/transform/weather.rs

use serde::Serialize;

use super::{finish, writer};
use crate::error::Error;
use crate::fetch::weather::WeatherReport;

/// Column order of every weather table.
pub const WEATHER_COLUMNS: [&str; 12] = [
    "weather",
    "weather_desc",
    "temp",
    "feels_like",
    "pressure",
    "humidity",
    "visibility",
    "wind_speed",
    "wind_deg",
    "clouds",
    "dt",
    "city",
];

/// One city's snapshot. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherRow {
    pub weather: String,
    pub weather_desc: String,
    pub temp: String,
    pub feels_like: String,
    pub pressure: String,
    pub humidity: String,
    pub visibility: String,
    pub wind_speed: String,
    pub wind_deg: String,
    pub clouds: String,
    pub dt: String,
    pub city: String,
}

/// The header line alone, newline-terminated.
pub fn header_line() -> String {
    // column names never need quoting
    format!("{}\n", WEATHER_COLUMNS.join(","))
}

/// Project a report onto the fixed column set. A missing report (the
/// city's fetch came back empty) yields no row.
pub fn to_row(report: Option<&WeatherReport>, city: &str) -> Option<WeatherRow> {
    let report = report?;
    let primary = report.primary();
    Some(WeatherRow {
        weather: primary.main.clone(),
        weather_desc: primary.description.clone(),
        temp: report.main.temp.to_string(),
        feels_like: report.main.feels_like.to_string(),
        pressure: report.main.pressure.to_string(),
        humidity: report.main.humidity.to_string(),
        visibility: report.visibility.to_string(),
        wind_speed: report.wind.speed.to_string(),
        wind_deg: report.wind.deg.to_string(),
        clouds: report.clouds.all.to_string(),
        dt: report.dt.to_string(),
        city: city.to_string(),
    })
}

/// Serialize rows without a header line; the header belongs to the
/// accumulated table.
pub fn rows_to_csv(rows: &[WeatherRow]) -> Result<String, Error> {
    let mut wtr = writer();
    for row in rows {
        wtr.serialize(row)?;
    }
    finish(wtr)
}
