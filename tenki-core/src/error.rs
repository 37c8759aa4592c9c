use thiserror::Error;

use crate::provider::ProviderId;

/// Failure taxonomy surfaced by the resolver and both provider adapters.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Malformed or disallowed input, e.g. a postal code sent to the global provider.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Transport failure or non-success HTTP status.
    #[error("{provider} is unavailable: {message}")]
    UpstreamUnavailable {
        provider: ProviderId,
        message: String,
    },

    /// A payload arrived but could not be turned into weather data.
    #[error("{provider} returned unusable data: {message}")]
    UpstreamData {
        provider: ProviderId,
        message: String,
    },

    /// A configured base URL could not be combined with the request path.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("No current location is available")]
    LocationUnavailable,
}

impl WeatherError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn data(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::UpstreamData {
            provider,
            message: message.into(),
        }
    }

    /// Provider that produced the error, if it came from upstream.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::UpstreamUnavailable { provider, .. } | Self::UpstreamData { provider, .. } => {
                Some(*provider)
            }
            _ => None,
        }
    }
}
