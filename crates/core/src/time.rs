use chrono::{DateTime, Utc};

/// Unix timestamp in whole seconds, clamped to zero for pre-epoch instants.
pub fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}
