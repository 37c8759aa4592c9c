use reqwest::Url;

use crate::error::WeatherError;

pub mod kujira;
pub mod weatherapi;

pub use kujira::KujiraProvider;
pub use weatherapi::WeatherApiProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// WeatherAPI.com: global current conditions, any place or coordinate.
    WeatherApi,
    /// Kujira Web API: Japan-only weekly forecast keyed by city name.
    Kujira,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::Kujira => "kujira",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherApi, ProviderId::Kujira]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "https://api.weatherapi.com",
            ProviderId::Kujira => "https://api.aoikujira.com",
        }
    }

    /// Whether requests to this provider carry an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::WeatherApi)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "kujira" => Ok(ProviderId::Kujira),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherapi, kujira."
            )),
        }
    }
}

/// Join `path` onto a provider base URL and attach query parameters.
pub(crate) fn endpoint(
    base: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Url, WeatherError> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse_with_params(&joined, query)
        .map_err(|e| WeatherError::InvalidUrl(format!("{joined}: {e}")))
}
