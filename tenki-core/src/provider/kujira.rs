use std::{collections::BTreeMap, fmt, sync::Arc};

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Asia::Tokyo;
use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, MapAccess, Visitor},
};
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    http::HttpFetch,
    model::{CanonicalWeather, Condition, celsius_to_fahrenheit, defaults},
    provider::{ProviderId, endpoint},
    tables::REGIONAL_DEFAULT_CITY,
};

const PROVIDER: ProviderId = ProviderId::Kujira;

/// Top-level key carrying the catalog's generation date rather than a city.
const METADATA_KEY: &str = "mkdate";

// The regional provider has no coordinates; every record is placed in Tokyo.
const TOKYO_LAT: f64 = 35.6812;
const TOKYO_LON: f64 = 139.7671;
const JAPAN: &str = "日本";
const TZ_ID: &str = "Asia/Tokyo";

const ICON_BASE: &str = "//cdn.weatherapi.com/weather/64x64/day";

pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Clone)]
pub struct KujiraProvider {
    http: Arc<dyn HttpFetch>,
    base_url: String,
    clock: Clock,
}

impl KujiraProvider {
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            base_url: PROVIDER.default_base_url().to_string(),
            clock: Utc::now,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the source of "now" used for local time and the day/night flag.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Today's forecast for `city_id`, converted into a canonical record.
    ///
    /// A catalog with no usable city yields [`dummy_weather`] instead of an error.
    pub async fn fetch_by_city(&self, city_id: &str) -> Result<CanonicalWeather, WeatherError> {
        let url = endpoint(
            &self.base_url,
            "tenki/week.php",
            &[("city", city_id), ("fmt", "json")],
        )?;

        info!(provider = %PROVIDER, city = city_id, "requesting regional forecast");

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

        let catalog = decode_catalog(&res.body)?;
        let now = (self.clock)();

        if catalog.cities.is_empty() {
            warn!(city = city_id, "regional catalog has no cities, using placeholder record");
        }

        Ok(catalog.to_weather(city_id, now))
    }
}

/// One city's forecast for one day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionalForecastEntry {
    pub date: String,
    pub forecast: String,
    pub mintemp: String,
    pub maxtemp: String,
    pub poptimes: String,
    pub waves: String,
    pub winds: String,
    #[serde(default)]
    pub weathers: Option<String>,
}

/// City id to its daily forecasts, today first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionalCatalog {
    pub mkdate: Option<String>,
    pub cities: BTreeMap<String, Vec<RegionalForecastEntry>>,
}

impl RegionalCatalog {
    /// Pick the city to report and its day-0 entry.
    ///
    /// Order: the requested city, the default city, then the first city with any
    /// entries at all.
    pub fn select(&self, city_id: &str) -> Option<(&str, &RegionalForecastEntry)> {
        let today = |name: &str| {
            self.cities
                .get_key_value(name)
                .and_then(|(key, days)| days.first().map(|entry| (key.as_str(), entry)))
        };

        today(city_id)
            .or_else(|| today(REGIONAL_DEFAULT_CITY))
            .or_else(|| {
                self.cities
                    .iter()
                    .find_map(|(key, days)| days.first().map(|entry| (key.as_str(), entry)))
            })
    }

    pub fn to_weather(&self, city_id: &str, now: DateTime<Utc>) -> CanonicalWeather {
        match self.select(city_id) {
            Some((city, entry)) => {
                if city != city_id {
                    debug!(requested = city_id, used = city, "regional city substituted");
                }
                entry_to_weather(city, entry, now)
            }
            None => dummy_weather(city_id, now),
        }
    }
}

impl<'de> Deserialize<'de> for RegionalCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Either a value of the expected shape or anything else, which is skipped.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Other(#[allow(dead_code)] IgnoredAny),
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = RegionalCatalog;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of city names to daily forecasts")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut catalog = RegionalCatalog::default();

        while let Some(key) = map.next_key::<String>()? {
            if key == METADATA_KEY {
                if let Lenient::Valid(mkdate) = map.next_value::<Lenient<String>>()? {
                    catalog.mkdate = Some(mkdate);
                }
                continue;
            }

            match map.next_value::<Lenient<Vec<RegionalForecastEntry>>>()? {
                Lenient::Valid(days) => {
                    catalog.cities.insert(key, days);
                }
                Lenient::Other(_) => debug!(key = %key, "skipping undecodable regional entry"),
            }
        }

        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct KujiraErrorBody {
    error: String,
}

/// Decode a regional payload, treating `{"error": ..}` as a provider failure.
pub fn decode_catalog(body: &[u8]) -> Result<RegionalCatalog, WeatherError> {
    if let Ok(KujiraErrorBody { error }) = serde_json::from_slice::<KujiraErrorBody>(body) {
        return Err(WeatherError::data(PROVIDER, format!("provider error: {error}")));
    }

    serde_json::from_slice(body)
        .map_err(|e| WeatherError::data(PROVIDER, format!("failed to parse forecast JSON: {e}")))
}

struct ConditionRule {
    words: &'static [&'static str],
    icon: u16,
    code: i32,
}

/// Whole-word forecasts, checked before the combination rules.
const EXACT_RULES: &[ConditionRule] = &[
    ConditionRule {
        words: &["晴", "晴れ", "快晴", "はれ"],
        icon: 113,
        code: 1000,
    },
    ConditionRule {
        words: &["曇", "曇り", "くもり"],
        icon: 119,
        code: 1003,
    },
    ConditionRule {
        words: &["雨", "小雨", "あめ"],
        icon: 308,
        code: 1063,
    },
    ConditionRule {
        words: &["大雨"],
        icon: 308,
        code: 1195,
    },
    ConditionRule {
        words: &["雪", "小雪", "ゆき"],
        icon: 326,
        code: 1066,
    },
    ConditionRule {
        words: &["大雪"],
        icon: 326,
        code: 1225,
    },
    ConditionRule {
        words: &["霧", "霞", "もや"],
        icon: 248,
        code: 1030,
    },
    ConditionRule {
        words: &["雷", "雷雨", "かみなり"],
        icon: 389,
        code: 1087,
    },
];

/// Forecasts such as "晴れ時々曇り" that mention two conditions.
const COMBINATION_RULES: &[(&str, &str, u16, i32)] = &[
    ("晴", "曇", 116, 1003),
    ("晴", "雨", 176, 1063),
    ("曇", "雨", 266, 1063),
];

const DEFAULT_RULE: (u16, i32) = (119, 1003);

fn icon_ref(icon: u16) -> String {
    format!("{ICON_BASE}/{icon}.png")
}

/// Icon and numeric code for a Japanese forecast phrase.
pub fn condition_for(text: &str) -> Condition {
    let (icon, code) = EXACT_RULES
        .iter()
        .find(|rule| rule.words.contains(&text))
        .map(|rule| (rule.icon, rule.code))
        .or_else(|| {
            COMBINATION_RULES
                .iter()
                .find(|(a, b, _, _)| text.contains(a) && text.contains(b))
                .map(|&(_, _, icon, code)| (icon, code))
        })
        .unwrap_or(DEFAULT_RULE);

    Condition {
        text: text.to_string(),
        icon: icon_ref(icon),
        code,
    }
}

/// Daytime is 06:00 up to 18:00 Japan time.
pub fn is_daytime(now: DateTime<Utc>) -> bool {
    (6..18).contains(&now.with_timezone(&Tokyo).hour())
}

fn base_record(
    city: &str,
    now: DateTime<Utc>,
    temp_c: f64,
    is_day: bool,
    condition: Condition,
) -> CanonicalWeather {
    let local = now.with_timezone(&Tokyo).format("%Y-%m-%d %H:%M").to_string();
    let temp_f = celsius_to_fahrenheit(temp_c);

    CanonicalWeather {
        name: city.to_string(),
        region: JAPAN.to_string(),
        country: JAPAN.to_string(),
        lat: TOKYO_LAT,
        lon: TOKYO_LON,
        tz_id: TZ_ID.to_string(),
        localtime_epoch: now.timestamp(),
        localtime: local.clone(),
        last_updated_epoch: now.timestamp(),
        last_updated: local,
        temp_c,
        temp_f,
        feelslike_c: temp_c,
        feelslike_f: temp_f,
        is_day,
        condition,
        wind_kph: defaults::WIND_KPH,
        wind_degree: defaults::WIND_DEGREE,
        wind_dir: defaults::WIND_DIR.to_string(),
        gust_kph: defaults::GUST_KPH,
        pressure_mb: defaults::PRESSURE_MB,
        precip_mm: defaults::PRECIP_MM,
        humidity: defaults::HUMIDITY,
        cloud: defaults::CLOUD,
        vis_km: defaults::VIS_KM,
        uv: defaults::UV,
    }
}

pub fn entry_to_weather(
    city: &str,
    entry: &RegionalForecastEntry,
    now: DateTime<Utc>,
) -> CanonicalWeather {
    let temp_c = entry.maxtemp.trim().parse::<f64>().unwrap_or(defaults::TEMP_C);
    base_record(city, now, temp_c, is_daytime(now), condition_for(&entry.forecast))
}

/// Clear-sky placeholder used when the catalog holds no usable city.
pub fn dummy_weather(city: &str, now: DateTime<Utc>) -> CanonicalWeather {
    let condition = Condition {
        text: "晴れ".to_string(),
        icon: icon_ref(113),
        code: 1000,
    };
    base_record(city, now, defaults::TEMP_C, true, condition)
}
