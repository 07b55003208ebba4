//! Rejection reasons reported by the engine.
//!
//! None of these are fatal. The lenient entry points log them with `warn!` and hand
//! back the input state; [`crate::engine::try_increment_stats`] returns them so a
//! host can surface the reason.

use crate::GeoSample;

/// Why a sample was not applied to an [`crate::EngineState`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleRejection {
    #[error("invalid coordinates ({latitude}, {longitude}) at {timestamp_ms}")]
    InvalidCoordinates {
        latitude: f64,
        longitude: f64,
        timestamp_ms: i64,
    },

    #[error("engine state is not initialized")]
    Uninitialized,

    #[error("sample at {timestamp_ms} precedes start {session_start_ms} of ended session {session_id}")]
    StaleSample {
        timestamp_ms: i64,
        session_start_ms: i64,
        session_id: String,
    },

    #[error("sample at {timestamp_ms} is older than last processed sample at {last_timestamp_ms}")]
    OutOfOrder {
        timestamp_ms: i64,
        last_timestamp_ms: i64,
    },

    #[error("sample at {timestamp_ms} declined by deduplication filter")]
    Filtered { timestamp_ms: i64 },
}

impl SampleRejection {
    pub(crate) fn invalid(sample: &GeoSample) -> Self {
        Self::InvalidCoordinates {
            latitude: sample.latitude,
            longitude: sample.longitude,
            timestamp_ms: sample.timestamp_ms,
        }
    }
}

/// Failure encoding or decoding persisted lifetime totals.
#[cfg(feature = "persistence")]
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("persisted totals are corrupt: {0}")]
    Corrupt(String),
}
