//! Place-name normalization into each provider's key space.

use tracing::debug;

use crate::classify::{is_postal_code, postal_digits};
use crate::tables;

/// Rewrite a query into the form the global provider geocodes best.
///
/// Unknown postal codes come back as bare digits; callers must still refuse
/// to send them upstream.
pub fn normalize_for_global(query: &str) -> String {
    if is_postal_code(query) {
        let digits = postal_digits(query);
        return match tables::postal_place(&digits) {
            Some(place) => match tables::city_name(place) {
                Some(name) => {
                    debug!(%digits, place, mapped = name, "postal code mapped to place name");
                    name.to_string()
                }
                None => place.to_string(),
            },
            None => {
                debug!(%digits, "postal code not in table, passing digits through");
                digits
            }
        };
    }

    if let Some(name) = tables::city_name(query) {
        debug!(query, mapped = name, "mapped Japanese place name");
        return name.to_string();
    }

    query.to_string()
}

/// City id for the regional provider, or an empty string when it has no coverage.
pub fn normalize_for_regional(query: &str) -> String {
    if is_postal_code(query) {
        let digits = postal_digits(query);
        if let Some(id) = tables::postal_place(&digits).and_then(tables::regional_city_id) {
            return id.to_string();
        }
    }

    if let Some(id) = tables::regional_city_id(query) {
        return id.to_string();
    }

    if let Some(id) = tables::city_name(query).and_then(tables::regional_city_id) {
        return id.to_string();
    }

    String::new()
}
