//! Core library for the `tenki` weather CLI.
//!
//! This crate defines:
//! - Query classification and place-name normalization (Japanese names, postal codes)
//! - Adapters for the global (WeatherAPI.com) and regional (Kujira, Japan-only) providers
//! - The resolver that picks a provider, falls back, and returns [`CanonicalWeather`]
//! - Configuration & credentials handling
//!
//! Transport and "current location" are injected through [`HttpFetch`] and
//! [`LocationSource`], so the engine can run against stubs in tests.

pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod resolver;
pub mod tables;

pub use classify::{QueryClass, classify};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use http::{HttpError, HttpFetch, HttpResponse, ReqwestFetcher};
pub use location::{FixedLocation, LocationSource};
pub use model::{
    CanonicalWeather, Condition, Coordinates, LocationQuery, celsius_to_fahrenheit,
    fahrenheit_to_celsius,
};
pub use normalize::{normalize_for_global, normalize_for_regional};
pub use provider::{KujiraProvider, ProviderId, WeatherApiProvider};
pub use resolver::WeatherResolver;
