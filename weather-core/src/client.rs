use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::model::{Coordinates, ForecastDay, Units, WeatherSnapshot};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Daily records requested from the forecast endpoint: today plus seven days.
const FORECAST_DAYS: &str = "8";

/// Client for the OpenWeatherMap current-weather and daily-forecast
/// endpoints.
///
/// Responses are parsed defensively: a record either yields every expected
/// field or the whole call fails with a [`FetchError`]. Nothing is cached.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a non-default endpoint. Tests point this at a mock
    /// server.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        Self::with_base_url_and_timeout(api_key, base_url, REQUEST_TIMEOUT)
    }

    /// As [`Self::with_base_url`] but with an explicit request timeout.
    pub fn with_base_url_and_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// The underlying HTTP client, shared with the icon cache so icon
    /// downloads reuse the same connection pool and timeout.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Fetch the current weather for a city.
    pub async fn current(&self, city: &str, units: Units) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        tracing::debug!(city, units = units.as_query(), "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("units", units.as_query()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        snapshot_from_json(&body, city)
    }

    /// Fetch the daily forecast for a location, up to eight days in wire
    /// order starting with today. Dropping the "today" entry is caller
    /// policy.
    pub async fn forecast(
        &self,
        coord: Coordinates,
        units: Units,
    ) -> Result<Vec<ForecastDay>, FetchError> {
        let url = format!("{}/data/2.5/forecast/daily", self.base_url);
        let lat = coord.latitude.to_string();
        let lon = coord.longitude.to_string();

        tracing::debug!(%lat, %lon, "requesting daily forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("cnt", FORECAST_DAYS),
                ("units", units.as_query()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        forecast_from_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(with = "chrono::serde::ts_seconds")]
    sunrise: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    sunset: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    coord: Option<OwCoord>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDailyEntry {
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    temp: OwDailyTemp,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwDailyEntry>,
}

fn snapshot_from_json(body: &str, queried_city: &str) -> Result<WeatherSnapshot, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .ok_or(FetchError::MissingField("weather"))?;

    Ok(WeatherSnapshot {
        // Some responses omit the resolved name; fall back to the query text.
        city: parsed.name.unwrap_or_else(|| queried_city.to_string()),
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        clouds_pct: parsed.clouds.all,
        wind_speed: parsed.wind.speed,
        description: condition.description,
        icon: condition.icon,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        coord: parsed.coord.map(|c| Coordinates {
            latitude: c.lat,
            longitude: c.lon,
        }),
    })
}

fn forecast_from_json(body: &str) -> Result<Vec<ForecastDay>, FetchError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)?;

    parsed
        .list
        .into_iter()
        .map(|entry| {
            let condition = entry
                .weather
                .into_iter()
                .next()
                .ok_or(FetchError::MissingField("weather"))?;

            Ok(ForecastDay {
                date: entry.dt.date_naive(),
                icon: condition.icon,
                description: condition.description,
                temp_max: entry.temp.max,
                temp_min: entry.temp.min,
            })
        })
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CURRENT_BODY: &str = r#"{
        "main": {"temp": 15.2, "feels_like": 14.1, "humidity": 70},
        "weather": [{"description": "cloudy", "icon": "04d"}],
        "wind": {"speed": 3.1},
        "clouds": {"all": 80},
        "sys": {"sunrise": 1700000000, "sunset": 1700040000}
    }"#;

    #[test]
    fn snapshot_fields_match_source_json() {
        let snap = snapshot_from_json(CURRENT_BODY, "London").expect("body must parse");

        assert_eq!(snap.city, "London");
        assert_eq!(snap.temperature, 15.2);
        assert_eq!(snap.feels_like, 14.1);
        assert_eq!(snap.humidity_pct, 70);
        assert_eq!(snap.clouds_pct, 80);
        assert_eq!(snap.wind_speed, 3.1);
        assert_eq!(snap.description, "cloudy");
        assert_eq!(snap.icon, "04d");
        assert_eq!(snap.sunrise.timestamp(), 1_700_000_000);
        assert_eq!(snap.sunset.timestamp(), 1_700_040_000);
        assert!(snap.coord.is_none());
    }

    #[test]
    fn snapshot_prefers_reported_name_and_coord() {
        let body = r#"{
            "name": "Greater London",
            "coord": {"lat": 51.51, "lon": -0.13},
            "main": {"temp": 10.0, "feels_like": 9.0, "humidity": 60},
            "weather": [{"description": "mist", "icon": "50d"}],
            "wind": {"speed": 1.0},
            "clouds": {"all": 100},
            "sys": {"sunrise": 1700000000, "sunset": 1700040000}
        }"#;

        let snap = snapshot_from_json(body, "london").expect("body must parse");
        assert_eq!(snap.city, "Greater London");
        let coord = snap.coord.expect("coord must be present");
        assert_eq!(coord.latitude, 51.51);
        assert_eq!(coord.longitude, -0.13);
    }

    #[test]
    fn snapshot_rejects_empty_weather_array() {
        let body = r#"{
            "main": {"temp": 15.2, "feels_like": 14.1, "humidity": 70},
            "weather": [],
            "wind": {"speed": 3.1},
            "clouds": {"all": 80},
            "sys": {"sunrise": 1700000000, "sunset": 1700040000}
        }"#;

        match snapshot_from_json(body, "London") {
            Err(FetchError::MissingField("weather")) => {}
            other => panic!("expected MissingField(weather), got {other:?}"),
        }
    }

    #[test]
    fn snapshot_rejects_missing_required_field() {
        // No "wind" object at all.
        let body = r#"{
            "main": {"temp": 15.2, "feels_like": 14.1, "humidity": 70},
            "weather": [{"description": "cloudy", "icon": "04d"}],
            "clouds": {"all": 80},
            "sys": {"sunrise": 1700000000, "sunset": 1700040000}
        }"#;

        assert!(matches!(
            snapshot_from_json(body, "London"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn forecast_parses_daily_entries_in_order() {
        let body = r#"{
            "list": [
                {
                    "dt": 1700000000,
                    "temp": {"min": 4.0, "max": 9.5},
                    "weather": [{"description": "light rain", "icon": "10d"}]
                },
                {
                    "dt": 1700086400,
                    "temp": {"min": 2.5, "max": 7.0},
                    "weather": [{"description": "clear sky", "icon": "01d"}]
                }
            ]
        }"#;

        let days = forecast_from_json(body).expect("body must parse");
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(days[0].icon, "10d");
        assert_eq!(days[0].temp_max, 9.5);
        assert_eq!(days[1].description, "clear sky");
        assert_eq!(days[1].temp_min, 2.5);
    }

    #[test]
    fn forecast_rejects_entry_without_weather() {
        let body = r#"{
            "list": [
                {"dt": 1700000000, "temp": {"min": 4.0, "max": 9.5}, "weather": []}
            ]
        }"#;

        assert!(matches!(
            forecast_from_json(body),
            Err(FetchError::MissingField("weather"))
        ));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() < body.len());
    }
}
