use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::{
    classify::classify,
    config::Config,
    error::WeatherError,
    http::{HttpFetch, ReqwestFetcher},
    location::LocationSource,
    model::{CanonicalWeather, Coordinates, LocationQuery},
    normalize::{normalize_for_global, normalize_for_regional},
    provider::{KujiraProvider, ProviderId, WeatherApiProvider},
};

/// Entry point for callers: picks a provider, falls back, returns one record shape.
///
/// Holds no mutable state; share it behind an `Arc` across tasks.
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    global: WeatherApiProvider,
    regional: KujiraProvider,
    regional_enabled: bool,
}

impl WeatherResolver {
    pub fn new(global: WeatherApiProvider, regional: KujiraProvider) -> Self {
        Self {
            global,
            regional,
            regional_enabled: true,
        }
    }

    /// Toggle routing of Japanese queries to the regional provider.
    pub fn with_regional(mut self, enabled: bool) -> Self {
        self.regional_enabled = enabled;
        self
    }

    /// Build both adapters from config over the given transport.
    pub fn from_config(config: &Config, http: Arc<dyn HttpFetch>) -> anyhow::Result<Self> {
        let id = ProviderId::WeatherApi;
        let api_key = config.provider_api_key(id).ok_or_else(|| {
            anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `tenki configure {id}` and enter your API key."
            )
        })?;

        let global = WeatherApiProvider::new(api_key, http.clone())
            .with_base_url(config.base_url(id))
            .with_lang(config.language.as_str());
        let regional = KujiraProvider::new(http).with_base_url(config.base_url(ProviderId::Kujira));

        Ok(Self::new(global, regional).with_regional(config.regional_enabled))
    }

    /// Same as [`WeatherResolver::from_config`] over the default `reqwest` transport.
    pub fn from_config_default(config: &Config) -> anyhow::Result<Self> {
        let http = ReqwestFetcher::new(Duration::from_secs(config.timeout_secs));
        Self::from_config(config, Arc::new(http))
    }

    pub async fn resolve_query(
        &self,
        query: LocationQuery,
    ) -> Result<CanonicalWeather, WeatherError> {
        match query {
            LocationQuery::Text(text) => self.resolve(&text).await,
            LocationQuery::Coordinates(c) => {
                self.resolve_coordinates(c.latitude, c.longitude).await
            }
        }
    }

    pub async fn resolve_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CanonicalWeather, WeatherError> {
        let coordinates = Coordinates::new(latitude, longitude)?;
        debug!(latitude, longitude, "resolving coordinates");
        self.global.fetch_by_coordinates(coordinates).await
    }

    /// Weather at wherever `source` last saw the user.
    pub async fn resolve_current(
        &self,
        source: &dyn LocationSource,
    ) -> Result<CanonicalWeather, WeatherError> {
        let coordinates = source
            .last_known()
            .await
            .ok_or(WeatherError::LocationUnavailable)?;
        self.resolve_coordinates(coordinates.latitude, coordinates.longitude)
            .await
    }

    /// Resolve a free-text place name or postal code.
    ///
    /// Japanese queries try the regional provider first when it covers them;
    /// any regional failure falls through to the global provider, whose outcome
    /// is final.
    pub async fn resolve(&self, query: &str) -> Result<CanonicalWeather, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::invalid_query("empty location query"));
        }

        let class = classify(query);
        debug!(query, ?class, "classified query");

        if class.is_japanese_domain && self.regional_enabled {
            let city_id = normalize_for_regional(query);
            if city_id.is_empty() {
                debug!(query, "no regional coverage");
            } else {
                info!(query, city = %city_id, "using regional provider");
                match self.regional.fetch_by_city(&city_id).await {
                    Ok(weather) => return Ok(weather),
                    Err(err) => {
                        warn!(
                            query,
                            error = %err,
                            "regional provider failed, falling back to global"
                        );
                    }
                }
            }
        }

        let normalized = normalize_for_global(query);
        self.global.fetch_by_query(&normalized, query).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::{
        http::stub::StubFetch, location::FixedLocation,
        provider::weatherapi::fixtures::current_json,
    };

    const REGIONAL: &str = "week.php";
    const GLOBAL: &str = "current.json";

    fn noon_jst() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 3, 0, 0).unwrap()
    }

    fn resolver(stub: Arc<StubFetch>) -> WeatherResolver {
        let global = WeatherApiProvider::new("KEY".to_string(), stub.clone());
        let regional = KujiraProvider::new(stub).with_clock(noon_jst);
        WeatherResolver::new(global, regional)
    }

    fn regional_body(city: &str, forecast: &str, maxtemp: &str) -> String {
        serde_json::json!({
            "mkdate": "2026-10-15",
            city: [{
                "date": "10月15日", "forecast": forecast, "mintemp": "15", "maxtemp": maxtemp,
                "poptimes": "0/0/10/10", "waves": "0.5m", "winds": "北の風"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn japanese_city_uses_regional_provider() {
        let stub = Arc::new(
            StubFetch::new()
                .route(REGIONAL, 200, &regional_body("東京", "晴れ", "22"))
                .route(GLOBAL, 200, &current_json("Tokyo", "Tokyo", "Japan")),
        );

        let w = resolver(stub.clone()).resolve("東京").await.unwrap();

        assert_eq!(w.name, "東京");
        assert_eq!(w.temp_c, 22.0);
        assert!((w.temp_f - 71.6).abs() < 1e-9);
        assert_eq!(w.condition.text, "晴れ");
        assert_eq!(w.condition.code, 1000);
        assert_eq!(stub.calls_to(GLOBAL), 0);
    }

    #[tokio::test]
    async fn regional_error_payload_falls_back_to_global() {
        let stub = Arc::new(
            StubFetch::new()
                .route(REGIONAL, 200, r#"{"error": "no data"}"#)
                .route(GLOBAL, 200, &current_json("Tokyo", "Tokyo", "Japan")),
        );

        let w = resolver(stub.clone()).resolve("東京").await.unwrap();

        assert_eq!(w.name, "Tokyo");
        assert_eq!(stub.calls_to(REGIONAL), 1);
        assert_eq!(stub.calls_to("q=Tokyo"), 1);
    }

    #[tokio::test]
    async fn catalog_without_usable_city_yields_dummy_record() {
        let stub = Arc::new(
            StubFetch::new()
                .route(REGIONAL, 200, r#"{"mkdate": "2026-10-15", "札幌": []}"#)
                .route(GLOBAL, 200, &current_json("Sapporo", "Hokkaido", "Japan")),
        );

        let w = resolver(stub.clone()).resolve("札幌").await.unwrap();

        assert_eq!(w.name, "札幌");
        assert_eq!(w.temp_c, 20.0);
        assert_eq!(w.condition.code, 1000);
        assert_eq!(stub.calls_to(REGIONAL), 1);
        assert_eq!(stub.calls_to(GLOBAL), 0);
    }

    #[tokio::test]
    async fn regional_failures_never_surface() {
        let stub = Arc::new(
            StubFetch::new()
                .fail(REGIONAL, "connection reset")
                .route(GLOBAL, 500, "global down"),
        );

        let err = resolver(stub.clone()).resolve("大阪").await.unwrap_err();

        // The reported failure is the global one.
        assert_eq!(err.provider(), Some(ProviderId::WeatherApi));
        assert_eq!(stub.calls_to(REGIONAL), 1);
        assert_eq!(stub.calls_to("q=Osaka"), 1);
    }

    #[tokio::test]
    async fn unknown_postal_code_is_invalid_without_any_request() {
        let stub = Arc::new(StubFetch::new());
        let r = resolver(stub.clone());

        for q in ["1234567", "123-4567"] {
            let err = r.resolve(q).await.unwrap_err();
            assert!(matches!(err, WeatherError::InvalidQuery(_)), "{q}: {err}");
        }
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn known_postal_code_goes_to_regional_city() {
        let stub = Arc::new(
            StubFetch::new().route(REGIONAL, 200, &regional_body("東京", "曇り", "18")),
        );

        let w = resolver(stub.clone()).resolve("100-0001").await.unwrap();

        assert_eq!(w.name, "東京");
        assert_eq!(stub.calls(), vec!["/tenki/week.php?city=東京&fmt=json".to_string()]);
    }

    #[tokio::test]
    async fn uncovered_japanese_place_goes_straight_to_global() {
        let stub = Arc::new(
            StubFetch::new().route(GLOBAL, 200, &current_json("Kyoto", "Kyoto", "Japan")),
        );

        let w = resolver(stub.clone()).resolve("京都").await.unwrap();

        assert_eq!(w.name, "Kyoto");
        assert_eq!(stub.calls_to(REGIONAL), 0);
        assert_eq!(stub.calls_to("q=Kyoto"), 1);
    }

    #[tokio::test]
    async fn regional_disabled_skips_regional_provider() {
        let stub = Arc::new(
            StubFetch::new()
                .route(REGIONAL, 200, &regional_body("東京", "晴れ", "22"))
                .route(GLOBAL, 200, &current_json("Tokyo", "Tokyo", "Japan")),
        );

        let w = resolver(stub.clone()).with_regional(false).resolve("東京").await.unwrap();

        assert_eq!(w.name, "Tokyo");
        assert_eq!(stub.calls_to(REGIONAL), 0);
    }

    #[tokio::test]
    async fn non_japanese_query_passes_through() {
        let stub = Arc::new(
            StubFetch::new().route(GLOBAL, 200, &current_json("London", "City of London", "UK")),
        );

        resolver(stub.clone()).resolve("  London ").await.unwrap();

        assert_eq!(stub.calls(), vec!["/v1/current.json?key=KEY&q=London&lang=ja".to_string()]);
    }

    #[tokio::test]
    async fn yao_is_corrected_after_global_lookup() {
        let stub = Arc::new(
            StubFetch::new().route(GLOBAL, 200, &current_json("Yen Bai", "Yen Bai", "Vietnam")),
        );

        let w = resolver(stub.clone()).resolve("大阪府八尾市").await.unwrap();

        // Regional lookup maps the ward to 大阪 first; it 404s, then global answers.
        assert_eq!(stub.calls_to(REGIONAL), 1);
        assert_eq!(w.name, "八尾市");
        assert_eq!(w.country, "日本");
    }

    #[tokio::test]
    async fn empty_query_is_invalid() {
        let stub = Arc::new(StubFetch::new());
        let err = resolver(stub).resolve("   ").await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn coordinate_queries_skip_classification() {
        let stub = Arc::new(
            StubFetch::new().route(GLOBAL, 200, &current_json("Tokyo", "Tokyo", "Japan")),
        );
        let r = resolver(stub.clone());

        let w = r
            .resolve_query(LocationQuery::Coordinates(Coordinates::new(35.0, 139.0).unwrap()))
            .await
            .unwrap();
        assert_eq!(w.name, "Tokyo");
        assert_eq!(stub.calls_to("q=35,139"), 1);

        let err = r.resolve_coordinates(120.0, 0.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn current_location_requires_a_fix() {
        let stub = Arc::new(
            StubFetch::new().route(GLOBAL, 200, &current_json("Tokyo", "Tokyo", "Japan")),
        );
        let r = resolver(stub);

        let err = r.resolve_current(&FixedLocation::unknown()).await.unwrap_err();
        assert!(matches!(err, WeatherError::LocationUnavailable));

        let here = FixedLocation::at(Coordinates::new(35.6812, 139.7671).unwrap());
        assert!(r.resolve_current(&here).await.is_ok());
    }

    #[test]
    fn from_config_requires_global_key() {
        let stub: Arc<dyn HttpFetch> = Arc::new(StubFetch::new());
        let mut cfg = Config::default();
        cfg.providers.insert(
            ProviderId::WeatherApi.as_str().to_string(),
            crate::config::ProviderConfig::default(),
        );

        // Only meaningful when the override variable is not set in the test environment.
        if std::env::var(crate::config::API_KEY_ENV).is_err() {
            let err = WeatherResolver::from_config(&cfg, stub.clone()).unwrap_err();
            assert!(err.to_string().contains("tenki configure weatherapi"));
        }

        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".into());
        cfg.regional_enabled = false;
        let r = WeatherResolver::from_config(&cfg, stub).unwrap();
        assert!(!r.regional_enabled);
    }
}
