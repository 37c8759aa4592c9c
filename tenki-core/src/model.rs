use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::invalid_query(format!(
                "coordinates out of range: {latitude},{longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// What the caller asked for: free text or a typed coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Text(String),
    Coordinates(Coordinates),
}

impl From<&str> for LocationQuery {
    fn from(value: &str) -> Self {
        LocationQuery::Text(value.to_string())
    }
}

impl From<Coordinates> for LocationQuery {
    fn from(value: Coordinates) -> Self {
        LocationQuery::Coordinates(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Icon reference in the global provider's CDN path form.
    pub icon: String,
    pub code: i32,
}

/// The normalized weather record every provider is converted into.
///
/// Every field is always populated; providers that lack a reading fill in the
/// neutral defaults from [`defaults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalWeather {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    pub localtime: String,

    pub last_updated_epoch: i64,
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub is_day: bool,
    pub condition: Condition,
    pub wind_kph: f64,
    pub wind_degree: i32,
    pub wind_dir: String,
    pub gust_kph: f64,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub humidity: u8,
    pub cloud: u8,
    pub vis_km: f64,
    pub uv: f64,
}

/// Neutral values used where an upstream provider has no reading.
pub mod defaults {
    pub const TEMP_C: f64 = 20.0;
    pub const WIND_KPH: f64 = 0.0;
    pub const WIND_DEGREE: i32 = 0;
    pub const WIND_DIR: &str = "N";
    pub const GUST_KPH: f64 = 0.0;
    pub const PRESSURE_MB: f64 = 1000.0;
    pub const PRECIP_MM: f64 = 0.0;
    pub const HUMIDITY: u8 = 50;
    pub const CLOUD: u8 = 0;
    pub const VIS_KM: f64 = 10.0;
    pub const UV: f64 = 0.0;
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}
