use async_trait::async_trait;

use crate::model::Coordinates;

/// Where "the current location" comes from: a GPS fix, an IP lookup, a config entry.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Last known position, or `None` when no fix is available.
    async fn last_known(&self) -> Option<Coordinates>;
}

/// Always reports the same position, or nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl FixedLocation {
    pub fn at(coordinates: Coordinates) -> Self {
        Self(Some(coordinates))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn last_known(&self) -> Option<Coordinates> {
        self.0
    }
}
