use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenki_core::{CanonicalWeather, Config};

/// Most searches kept on disk.
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub search_term: String,
    pub searched_at: DateTime<Utc>,
    pub location_name: String,
    pub temperature_c: f64,
    pub condition: String,
    pub icon: String,
}

/// Recent searches, newest first, one entry per search term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SearchHistory {
    pub fn load() -> Result<Self> {
        let path = Config::project_dirs()?.data_dir().join("history.json");
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let mut history = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read history file: {}", path.display()))?;
            serde_json::from_str::<SearchHistory>(&contents)
                .with_context(|| format!("Failed to parse history file: {}", path.display()))?
        } else {
            Self::default()
        };
        history.path = Some(path);
        Ok(history)
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        write_json(path, self)
    }

    /// Record a successful search, replacing any earlier entry for the same term.
    pub fn record(&mut self, search_term: &str, weather: &CanonicalWeather) {
        self.record_at(search_term, weather, Utc::now());
    }

    pub fn record_at(&mut self, search_term: &str, weather: &CanonicalWeather, at: DateTime<Utc>) {
        self.entries.retain(|e| e.search_term != search_term);
        self.entries.push_front(HistoryEntry {
            search_term: search_term.to_string(),
            searched_at: at,
            location_name: weather.name.clone(),
            temperature_c: weather.temp_c,
            condition: weather.condition.text.clone(),
            icon: weather.condition.icon.clone(),
        });
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn latest(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(limit)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn write_json(path: &Path, history: &SearchHistory) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(history).context("Failed to serialize history")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write history file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tenki_core::Condition;

    use super::*;

    fn weather(name: &str, temp_c: f64) -> CanonicalWeather {
        CanonicalWeather {
            name: name.to_string(),
            region: String::new(),
            country: "日本".to_string(),
            lat: 35.6812,
            lon: 139.7671,
            tz_id: "Asia/Tokyo".to_string(),
            localtime_epoch: 0,
            localtime: String::new(),
            last_updated_epoch: 0,
            last_updated: String::new(),
            temp_c,
            temp_f: tenki_core::celsius_to_fahrenheit(temp_c),
            feelslike_c: temp_c,
            feelslike_f: tenki_core::celsius_to_fahrenheit(temp_c),
            is_day: true,
            condition: Condition {
                text: "晴れ".to_string(),
                icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".to_string(),
                code: 1000,
            },
            wind_kph: 0.0,
            wind_degree: 0,
            wind_dir: "N".to_string(),
            gust_kph: 0.0,
            pressure_mb: 1000.0,
            precip_mm: 0.0,
            humidity: 50,
            cloud: 0,
            vis_km: 10.0,
            uv: 0.0,
        }
    }

    #[test]
    fn newest_first_and_deduplicated() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap();
        let mut history = SearchHistory::default();

        history.record_at("東京", &weather("東京", 20.0), t0);
        history.record_at("大阪", &weather("大阪", 22.0), t0 + Duration::minutes(1));
        history.record_at("東京", &weather("東京", 21.0), t0 + Duration::minutes(2));

        let terms: Vec<_> = history.latest(5).map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, ["東京", "大阪"]);
        assert_eq!(history.latest(1).next().unwrap().temperature_c, 21.0);
    }

    #[test]
    fn capped_at_max_entries() {
        let mut history = SearchHistory::default();
        for i in 0..15 {
            history.record(&format!("place {i}"), &weather("x", 10.0));
        }

        assert_eq!(history.latest(usize::MAX).count(), MAX_ENTRIES);
        assert_eq!(history.latest(1).next().unwrap().search_term, "place 14");
        assert_eq!(history.latest(3).count(), 3);
    }

    #[test]
    fn persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/history.json");

        let mut history = SearchHistory::load_from(path.clone()).unwrap();
        assert!(history.is_empty());
        history.record("London", &weather("London", 12.5));
        history.save().unwrap();

        let reloaded = SearchHistory::load_from(path).unwrap();
        let entry = reloaded.latest(1).next().unwrap();
        assert_eq!(entry.search_term, "London");
        assert_eq!(entry.temperature_c, 12.5);
    }
}
