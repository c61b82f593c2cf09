//! Core library for the desktop weather application.
//!
//! This crate defines:
//! - Credentials and search-history persistence
//! - The OpenWeatherMap client (current weather + daily forecast)
//! - The process-lifetime icon cache
//! - Shared domain models and the error taxonomy
//!
//! It is used by `weather-app`, but carries no GUI dependency and can be
//! reused by other frontends.

pub mod client;
pub mod config;
pub mod error;
pub mod icons;
pub mod model;

pub use client::WeatherClient;
pub use config::{Credentials, History};
pub use error::{ConfigError, FetchError, PersistenceError};
pub use icons::IconCache;
pub use model::{Coordinates, ForecastDay, Units, WeatherSnapshot};
