use std::fmt::Write;

use tenki_core::CanonicalWeather;

use crate::history::HistoryEntry;

pub fn weather(w: &CanonicalWeather) -> String {
    let mut out = String::new();

    let place = [w.name.as_str(), w.region.as_str(), w.country.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .fold(Vec::<&str>::new(), |mut parts, part| {
            if parts.last() != Some(&part) {
                parts.push(part);
            }
            parts
        })
        .join(", ");

    let _ = writeln!(out, "{place}");
    let _ = writeln!(out, "  {} ({})", w.localtime, w.tz_id);
    let _ = writeln!(
        out,
        "  {}  {:.1}°C / {:.1}°F  (feels like {:.1}°C)",
        w.condition.text, w.temp_c, w.temp_f, w.feelslike_c
    );
    let _ = writeln!(
        out,
        "  humidity {}%  cloud {}%  pressure {:.0} mb",
        w.humidity, w.cloud, w.pressure_mb
    );
    let _ = writeln!(
        out,
        "  wind {:.1} km/h {} ({}°)  precip {:.1} mm  vis {:.0} km  UV {:.0}",
        w.wind_kph, w.wind_dir, w.wind_degree, w.precip_mm, w.vis_km, w.uv
    );
    out
}

pub fn history<'a>(entries: impl Iterator<Item = &'a HistoryEntry>) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {:<12} {} {:.1}°C {}",
            entry.searched_at.format("%Y-%m-%d %H:%M"),
            entry.search_term,
            entry.location_name,
            entry.temperature_c,
            entry.condition
        );
    }
    out
}
