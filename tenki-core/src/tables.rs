//! Static lookup tables shared by the classifier, normalizer and adapters.
//!
//! All tables are read-only and built on first use.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Postal code (digits only) to Japanese place name.
pub static POSTAL_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("6128483", "京都"), // 京都市伏見区横大路
        ("1000001", "東京"), // 東京都千代田区
        ("5300001", "大阪"), // 大阪市北区
        ("2310023", "横浜"), // 横浜市中区
    ])
});

/// Japanese place name to the name the global provider geocodes best.
///
/// Values are usually English, but a few entries fold a ward or town into its
/// parent city in Japanese.
pub static CITY_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("東京", "Tokyo"),
        ("横浜", "Yokohama"),
        ("大阪", "Osaka"),
        ("名古屋", "Nagoya"),
        ("札幌", "Sapporo"),
        ("福岡", "Fukuoka"),
        ("京都", "Kyoto"),
        ("神戸", "Kobe"),
        ("広島", "Hiroshima"),
        ("仙台", "Sendai"),
        ("千葉", "Chiba"),
        ("さいたま", "Saitama"),
        ("埼玉", "Saitama"),
        ("川崎", "Kawasaki"),
        ("北海道", "Hokkaido"),
        ("沖縄", "Okinawa"),
        ("那覇", "Naha"),
        ("新潟", "Niigata"),
        ("浜松", "Hamamatsu"),
        ("熊本", "Kumamoto"),
        ("静岡", "Shizuoka"),
        ("岡山", "Okayama"),
        ("鹿児島", "Kagoshima"),
        ("つくば", "Tsukuba"),
        ("金沢", "Kanazawa"),
        ("長崎", "Nagasaki"),
        ("宮崎", "Miyazaki"),
        ("松山", "Matsuyama"),
        ("京都市", "Kyoto"),
        ("大阪市", "Osaka"),
        ("東京都", "Tokyo"),
        ("京都府", "Kyoto"),
        ("大阪府", "Osaka"),
        ("大阪府八尾市", "大阪"),
    ])
});

/// Place name to the city id the regional provider understands.
pub static REGIONAL_CITY_IDS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            ("札幌", "札幌"),
            ("仙台", "仙台"),
            ("東京", "東京"),
            ("新潟", "新潟"),
            ("金沢", "金沢"),
            ("名古屋", "名古屋"),
            ("大阪", "大阪"),
            ("広島", "広島"),
            ("高知", "高知"),
            ("福岡", "福岡"),
            ("鹿児島", "鹿児島"),
            ("那覇", "那覇"),
            ("横浜", "東京"),
            ("大阪府", "大阪"),
            ("東京都", "東京"),
        ])
    });

/// City the regional adapter falls back to when the requested one is missing.
pub const REGIONAL_DEFAULT_CITY: &str = "東京";

/// A known wrong-country geocode from the global provider and its fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misdetection {
    /// Substring of the raw query that triggers the correction.
    pub query_fragment: &'static str,
    /// Countries the provider wrongly reports for that query.
    pub detected_countries: &'static [&'static str],
    pub name: &'static str,
    pub region: &'static str,
    pub country: &'static str,
    pub tz_id: &'static str,
}

pub static MISDETECTIONS: &[Misdetection] = &[Misdetection {
    // "八尾" resolves to a town in Vietnam.
    query_fragment: "八尾",
    detected_countries: &["ベトナム", "Vietnam"],
    name: "八尾市",
    region: "大阪府",
    country: "日本",
    tz_id: "Asia/Tokyo",
}];

pub fn postal_place(digits: &str) -> Option<&'static str> {
    POSTAL_CODES.get(digits).copied()
}

pub fn city_name(place: &str) -> Option<&'static str> {
    CITY_NAMES.get(place).copied()
}

pub fn regional_city_id(place: &str) -> Option<&'static str> {
    REGIONAL_CITY_IDS.get(place).copied()
}

/// Find the correction for a raw query and the country the provider reported.
pub fn misdetection_for(raw_query: &str, country: &str) -> Option<&'static Misdetection> {
    MISDETECTIONS.iter().find(|m| {
        raw_query.contains(m.query_fragment) && m.detected_countries.contains(&country)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_postal_place_has_a_city_name() {
        for place in POSTAL_CODES.values() {
            assert!(city_name(place).is_some(), "{place} missing from CITY_NAMES");
        }
    }

    #[test]
    fn default_city_is_a_regional_id() {
        assert!(
            REGIONAL_CITY_IDS
                .values()
                .any(|id| *id == REGIONAL_DEFAULT_CITY)
        );
    }

    #[test]
    fn misdetection_requires_fragment_and_country() {
        assert!(misdetection_for("八尾", "Vietnam").is_some());
        assert!(misdetection_for("大阪府八尾市", "ベトナム").is_some());
        assert!(misdetection_for("八尾", "日本").is_none());
        assert!(misdetection_for("ハノイ", "Vietnam").is_none());
    }
}
