use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    classify::{is_japanese_domain, is_postal_code},
    error::WeatherError,
    http::HttpFetch,
    model::{CanonicalWeather, Condition, Coordinates, celsius_to_fahrenheit, defaults},
    provider::{ProviderId, endpoint},
    tables::misdetection_for,
};

const PROVIDER: ProviderId = ProviderId::WeatherApi;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Arc<dyn HttpFetch>,
    base_url: String,
    lang: String,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            api_key,
            http,
            base_url: PROVIDER.default_base_url().to_string(),
            lang: "ja".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Language for the condition text, e.g. "ja" or "en".
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CanonicalWeather, WeatherError> {
        let q = format!("{},{}", coordinates.latitude, coordinates.longitude);
        self.fetch_current(&q).await
    }

    /// Current conditions for an already-normalized place name.
    ///
    /// `raw` is what the caller originally typed; it decides both the postal
    /// code refusal and the misdetection correction.
    pub async fn fetch_by_query(
        &self,
        normalized: &str,
        raw: &str,
    ) -> Result<CanonicalWeather, WeatherError> {
        if normalized.trim().is_empty() {
            return Err(WeatherError::invalid_query("empty location query"));
        }
        if is_postal_code(raw) || is_postal_code(normalized) {
            debug!(query = raw, "refusing postal code search on global provider");
            return Err(WeatherError::invalid_query(format!(
                "postal code search is not supported: {raw}"
            )));
        }

        let mut weather = self.fetch_current(normalized).await?;

        if is_japanese_domain(raw) {
            correct_misdetection(&mut weather, raw);
        }

        debug!(
            name = %weather.name,
            region = %weather.region,
            country = %weather.country,
            "global provider resolved location"
        );
        Ok(weather)
    }

    async fn fetch_current(&self, q: &str) -> Result<CanonicalWeather, WeatherError> {
        let url = endpoint(
            &self.base_url,
            "v1/current.json",
            &[("key", self.api_key.as_str()), ("q", q), ("lang", self.lang.as_str())],
        )?;

        info!(provider = %PROVIDER, q, "requesting current conditions");

        let res = self
            .http
            .get(&url)
            .await
            .map_err(|e| WeatherError::unavailable(PROVIDER, e.to_string()))?;

        if !res.is_success() {
            return Err(WeatherError::unavailable(
                PROVIDER,
                format!("status {}: {}", res.status, res.body_snippet()),
            ));
        }

        let parsed: WaResponse = serde_json::from_slice(&res.body).map_err(|e| {
            WeatherError::data(PROVIDER, format!("failed to parse current JSON: {e}"))
        })?;

        Ok(parsed.into())
    }
}

/// Replace a known wrong-country identity, keeping coordinates and readings.
fn correct_misdetection(weather: &mut CanonicalWeather, raw: &str) {
    let Some(fix) = misdetection_for(raw, &weather.country) else {
        return;
    };

    warn!(
        from_name = %weather.name,
        from_country = %weather.country,
        to_name = fix.name,
        to_country = fix.country,
        "correcting misdetected location"
    );

    weather.name = fix.name.to_string();
    weather.region = fix.region.to_string();
    weather.country = fix.country.to_string();
    weather.tz_id = fix.tz_id.to_string();
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tz_id: String,
    #[serde(default)]
    localtime_epoch: i64,
    #[serde(default)]
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    code: i32,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    #[serde(default)]
    last_updated_epoch: Option<i64>,
    #[serde(default)]
    last_updated: Option<String>,
    temp_c: f64,
    temp_f: Option<f64>,
    #[serde(default)]
    is_day: Option<u8>,
    condition: WaCondition,
    wind_kph: Option<f64>,
    wind_degree: Option<i32>,
    wind_dir: Option<String>,
    pressure_mb: Option<f64>,
    precip_mm: Option<f64>,
    humidity: Option<u8>,
    cloud: Option<u8>,
    feelslike_c: Option<f64>,
    feelslike_f: Option<f64>,
    vis_km: Option<f64>,
    uv: Option<f64>,
    gust_kph: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaResponse> for CanonicalWeather {
    fn from(res: WaResponse) -> Self {
        let WaResponse { location, current } = res;

        let temp_f = current
            .temp_f
            .unwrap_or_else(|| celsius_to_fahrenheit(current.temp_c));
        let feelslike_c = current.feelslike_c.unwrap_or(current.temp_c);
        let feelslike_f = match (current.feelslike_c, current.feelslike_f) {
            (_, Some(f)) => f,
            (Some(c), None) => celsius_to_fahrenheit(c),
            (None, None) => temp_f,
        };
        let last_updated_epoch = current.last_updated_epoch.unwrap_or(location.localtime_epoch);
        let last_updated = current
            .last_updated
            .unwrap_or_else(|| location.localtime.clone());

        CanonicalWeather {
            name: location.name,
            region: location.region,
            country: location.country,
            lat: location.lat,
            lon: location.lon,
            tz_id: location.tz_id,
            localtime_epoch: location.localtime_epoch,
            localtime: location.localtime,
            last_updated_epoch,
            last_updated,
            temp_c: current.temp_c,
            temp_f,
            feelslike_c,
            feelslike_f,
            is_day: current.is_day.unwrap_or(1) != 0,
            condition: Condition {
                text: current.condition.text,
                icon: current.condition.icon,
                code: current.condition.code,
            },
            wind_kph: current.wind_kph.unwrap_or(defaults::WIND_KPH),
            wind_degree: current.wind_degree.unwrap_or(defaults::WIND_DEGREE),
            wind_dir: current
                .wind_dir
                .unwrap_or_else(|| defaults::WIND_DIR.to_string()),
            gust_kph: current.gust_kph.unwrap_or(defaults::GUST_KPH),
            pressure_mb: current.pressure_mb.unwrap_or(defaults::PRESSURE_MB),
            precip_mm: current.precip_mm.unwrap_or(defaults::PRECIP_MM),
            humidity: current.humidity.unwrap_or(defaults::HUMIDITY),
            cloud: current.cloud.unwrap_or(defaults::CLOUD),
            vis_km: current.vis_km.unwrap_or(defaults::VIS_KM),
            uv: current.uv.unwrap_or(defaults::UV),
        }
    }
}
