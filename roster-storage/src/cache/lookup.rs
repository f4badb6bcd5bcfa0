//! Tagged result of a cache lookup.

/// Outcome of reading a single cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The key is present and unexpired.
    Hit(String),
    /// The key is absent or has expired.
    Miss,
    /// The backend failed to answer; the key may or may not exist.
    BackendUnavailable(String),
}

impl CacheLookup {
    /// Returns true for a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Returns true when the backend could not answer.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }

    /// Stable label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Hit(_) => "hit",
            Self::Miss => "miss",
            Self::BackendUnavailable(_) => "unavailable",
        }
    }

    /// Consume the lookup, keeping only a hit's value.
    pub fn into_hit(self) -> Option<String> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::BackendUnavailable(_) => None,
        }
    }
}
