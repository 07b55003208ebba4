//! # Exploration Stats
//!
//! Distance, revealed area and active time from a stream of GPS samples.
//!
//! This library provides:
//! - Noise, jump and speed filtering of adjacent sample pairs
//! - Session detection from gaps in the sample stream
//! - Lifetime and per-session totals, incrementally or recomputed from history
//! - Fixed display strings for the UI
//!
//! ## Features
//!
//! - **`parallel`** - Reduce sessions in parallel with rayon during batch recompute
//! - **`persistence`** - serde derives and a JSON codec for lifetime totals
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use exploration_stats::{
//!     GeoSample, StatsConfig, create_initial_state, increment_stats,
//!     calculate_totals_from_history, format_distance, format_time,
//! };
//!
//! let config = StatsConfig::default();
//! let history = vec![
//!     GeoSample::new(51.5074, -0.1278, 0),
//!     GeoSample::new(51.5080, -0.1278, 30_000),
//!     GeoSample::new(51.5090, -0.1278, 60_000),
//! ];
//!
//! // Live updates, one sample at a time
//! let mut state = create_initial_state();
//! for sample in &history {
//!     state = increment_stats(&state, *sample, &config);
//! }
//!
//! // Or recompute from the stored history
//! let recomputed = calculate_totals_from_history(&history, &config);
//! assert_eq!(recomputed.total.active_time_ms, state.total.active_time_ms);
//!
//! println!("{} in {}", format_distance(state.total.distance_meters), format_time(state.total.active_time_ms));
//! ```

// Distance math
pub mod geo_utils;

pub mod error;
pub use error::SampleRejection;

// Pair classification and the revealed-area model
pub mod connectivity;
pub use connectivity::{Connectivity, PairClassification, classify_pair};
pub mod area;

// Sessions and the engine that drives them
pub mod session;
pub use session::{
    SessionMeta, SessionSummary,
    start_new_session, start_new_session_at,
    end_current_session, end_current_session_at,
    partition_sessions,
};

pub mod engine;
pub use engine::{
    EngineState, DeduplicationFilter,
    create_initial_state, create_initial_state_at,
    calculate_totals_from_history,
    increment_stats, try_increment_stats, increment_stats_filtered,
    reset_all_stats, restore_from_totals,
};

pub mod format;
pub use format::{format_distance, format_area, format_time, format_time_as_timer};

// JSON codec for lifetime totals
#[cfg(feature = "persistence")]
pub mod persistence;

#[cfg(feature = "persistence")]
pub use error::PersistenceError;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("ExplorationStats")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// Maximum gap between samples of the same session (10 minutes, inclusive).
pub const SESSION_GAP_THRESHOLD_MS: i64 = 10 * 60 * 1000;
/// Displacement below which a pair is treated as GPS jitter.
pub const MIN_MOVEMENT_METERS: f64 = 5.0;
/// Displacement above which a pair is treated as an erroneous fix.
pub const MAX_PLAUSIBLE_JUMP_METERS: f64 = 50_000.0;
/// Average speed above which a pair is treated as an erroneous fix.
pub const MAX_PLAUSIBLE_SPEED_MPS: f64 = 10.0;
/// Width of the strip counted as revealed along a connected path.
pub const REVEAL_CORRIDOR_WIDTH_METERS: f64 = 20.0;

/// One positioning reading.
///
/// # Example
/// ```
/// use exploration_stats::GeoSample;
/// let sample = GeoSample::new(51.5074, -0.1278, 1_700_000_000_000); // London
/// assert!(sample.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Capture time, Unix milliseconds
    pub timestamp_ms: i64,
}

impl GeoSample {
    /// Create a new sample.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self { latitude, longitude, timestamp_ms }
    }

    /// Check if the sample has valid coordinates.
    ///
    /// The timestamp is an integer and always finite.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Running distance, area and time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct AccumulatedTotals {
    pub distance_meters: f64,
    pub area_square_meters: f64,
    pub active_time_ms: i64,
}

impl AccumulatedTotals {
    /// Add one pair's contribution. Active time saturates at `i64::MAX`.
    pub fn accrue(&mut self, distance_meters: f64, area_square_meters: f64, active_time_ms: i64) {
        self.distance_meters += distance_meters;
        self.area_square_meters += area_square_meters;
        self.active_time_ms = self.active_time_ms.saturating_add(active_time_ms);
    }
}

impl std::ops::AddAssign for AccumulatedTotals {
    fn add_assign(&mut self, other: Self) {
        self.accrue(other.distance_meters, other.area_square_meters, other.active_time_ms);
    }
}

/// Calibration knobs for connectivity classification and area estimation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsConfig {
    /// Gap beyond which the next sample opens a new session.
    /// Default: 600,000 ms (10 minutes, inclusive)
    pub session_gap_threshold_ms: i64,

    /// Pairs closer than this are jitter and accrue no distance.
    /// Default: 5.0 meters
    pub min_movement_meters: f64,

    /// Pairs farther apart than this are erroneous fixes.
    /// Default: 50,000 meters
    pub max_plausible_jump_meters: f64,

    /// Pairs implying a faster average speed are erroneous fixes.
    /// Default: 10.0 m/s (fast run / casual bike ride)
    pub max_plausible_speed_mps: f64,

    /// Corridor width used to turn distance into revealed area.
    /// Default: 20.0 meters (10m reveal radius either side)
    pub reveal_corridor_width_meters: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            session_gap_threshold_ms: SESSION_GAP_THRESHOLD_MS,
            min_movement_meters: MIN_MOVEMENT_METERS,
            max_plausible_jump_meters: MAX_PLAUSIBLE_JUMP_METERS,
            max_plausible_speed_mps: MAX_PLAUSIBLE_SPEED_MPS,
            reveal_corridor_width_meters: REVEAL_CORRIDOR_WIDTH_METERS,
        }
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};

    /// Create a fresh engine state.
    #[uniffi::export]
    pub fn ffi_create_initial_state() -> EngineState {
        init_logging();
        let state = create_initial_state();
        info!("[ExplorationStats] Created initial state, session {}", state.current_session.session_id);
        state
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_stats_config() -> StatsConfig {
        init_logging();
        StatsConfig::default()
    }

    /// Recompute a state from a full ordered history.
    #[uniffi::export]
    pub fn ffi_calculate_totals_from_history(samples: Vec<GeoSample>) -> EngineState {
        ffi_calculate_totals_with_config(samples, StatsConfig::default())
    }

    /// Recompute a state with custom configuration.
    #[uniffi::export]
    pub fn ffi_calculate_totals_with_config(samples: Vec<GeoSample>, config: StatsConfig) -> EngineState {
        init_logging();
        info!("[ExplorationStats] calculate_totals_from_history called with {} samples", samples.len());

        let start = std::time::Instant::now();
        let state = calculate_totals_from_history(&samples, &config);
        info!("[ExplorationStats] Recomputed in {:?}", start.elapsed());

        state
    }

    /// Recompute from flat buffers (optimized for TypedArray input).
    /// `coords` is [lat1, lng1, lat2, lng2, ...]; `timestamps_ms` has one entry per point.
    #[uniffi::export]
    pub fn ffi_calculate_totals_from_flat(coords: Vec<f64>, timestamps_ms: Vec<i64>) -> EngineState {
        init_logging();
        if coords.len() != timestamps_ms.len() * 2 {
            warn!(
                "[ExplorationStats] Flat buffer mismatch: {} coords for {} timestamps, truncating",
                coords.len(),
                timestamps_ms.len()
            );
        }

        let samples: Vec<GeoSample> = coords
            .chunks_exact(2)
            .zip(timestamps_ms.iter())
            .map(|(chunk, &ts)| GeoSample::new(chunk[0], chunk[1], ts))
            .collect();

        ffi_calculate_totals_with_config(samples, StatsConfig::default())
    }

    /// Extend a state by one sample.
    #[uniffi::export]
    pub fn ffi_increment_stats(state: EngineState, sample: GeoSample) -> EngineState {
        init_logging();
        increment_stats(&state, sample, &StatsConfig::default())
    }

    /// Extend a state by one sample with custom configuration.
    #[uniffi::export]
    pub fn ffi_increment_stats_with_config(
        state: EngineState,
        sample: GeoSample,
        config: StatsConfig,
    ) -> EngineState {
        init_logging();
        increment_stats(&state, sample, &config)
    }

    #[uniffi::export]
    pub fn ffi_start_new_session(state: EngineState) -> EngineState {
        init_logging();
        start_new_session(&state)
    }

    #[uniffi::export]
    pub fn ffi_end_current_session(state: EngineState) -> EngineState {
        init_logging();
        end_current_session(&state)
    }

    #[uniffi::export]
    pub fn ffi_reset_all_stats() -> EngineState {
        init_logging();
        reset_all_stats()
    }

    /// Seed a state with lifetime totals loaded by the host.
    #[uniffi::export]
    pub fn ffi_restore_from_totals(total: AccumulatedTotals) -> EngineState {
        init_logging();
        info!(
            "[ExplorationStats] Restoring lifetime totals: {:.0}m, {}ms",
            total.distance_meters, total.active_time_ms
        );
        restore_from_totals(total)
    }

    /// Sessions detected in a history, for the activity list.
    #[uniffi::export]
    pub fn ffi_partition_sessions(samples: Vec<GeoSample>) -> Vec<SessionSummary> {
        init_logging();
        partition_sessions(&samples, &StatsConfig::default())
    }

    #[uniffi::export]
    pub fn ffi_format_distance(meters: f64) -> String {
        format_distance(meters)
    }

    #[uniffi::export]
    pub fn ffi_format_area(square_meters: f64) -> String {
        format_area(square_meters)
    }

    #[uniffi::export]
    pub fn ffi_format_time(ms: i64) -> String {
        format_time(ms)
    }

    #[uniffi::export]
    pub fn ffi_format_time_as_timer(ms: i64) -> String {
        format_time_as_timer(ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_sample_validation() {
        assert!(GeoSample::new(51.5074, -0.1278, 0).is_valid());
        assert!(GeoSample::new(-90.0, 180.0, 0).is_valid());
        assert!(!GeoSample::new(91.0, 0.0, 0).is_valid());
        assert!(!GeoSample::new(0.0, 181.0, 0).is_valid());
        assert!(!GeoSample::new(0.0, -180.5, 0).is_valid());
        assert!(!GeoSample::new(f64::NAN, 0.0, 0).is_valid());
        assert!(!GeoSample::new(0.0, f64::NEG_INFINITY, 0).is_valid());
    }

    #[test]
    fn test_default_config() {
        let config = StatsConfig::default();
        assert_eq!(config.session_gap_threshold_ms, 600_000);
        assert_eq!(config.min_movement_meters, 5.0);
        assert_eq!(config.max_plausible_jump_meters, 50_000.0);
        assert_eq!(config.max_plausible_speed_mps, 10.0);
    }

    #[test]
    fn test_totals_add_assign() {
        let mut a = AccumulatedTotals { distance_meters: 1.0, area_square_meters: 20.0, active_time_ms: 300 };
        a += AccumulatedTotals { distance_meters: 2.0, area_square_meters: 40.0, active_time_ms: 700 };
        assert_eq!(a, AccumulatedTotals { distance_meters: 3.0, area_square_meters: 60.0, active_time_ms: 1_000 });
    }

    #[test]
    fn test_totals_active_time_saturates() {
        let mut a = AccumulatedTotals { active_time_ms: i64::MAX - 10, ..AccumulatedTotals::default() };
        a.accrue(0.0, 0.0, 600_000);
        assert_eq!(a.active_time_ms, i64::MAX);
        a += AccumulatedTotals { active_time_ms: 1, ..AccumulatedTotals::default() };
        assert_eq!(a.active_time_ms, i64::MAX);
    }

    #[test]
    fn test_end_to_end_walk() {
        // ~22m every 10s for 10 minutes, then a 20 minute break, then 5 more minutes
        let config = StatsConfig::default();
        let mut history: Vec<GeoSample> = (0..=60)
            .map(|i| GeoSample::new(51.5 + i as f64 * 0.0002, -0.12, i * 10_000))
            .collect();
        let resume_at = 600_000 + 1_200_000;
        history.extend((0..=30).map(|i| GeoSample::new(51.52 + i as f64 * 0.0002, -0.12, resume_at + i * 10_000)));

        let state = calculate_totals_from_history(&history, &config);

        assert_eq!(state.total.active_time_ms, 600_000 + 300_000);
        assert_eq!(state.session.active_time_ms, 300_000);
        assert_eq!(state.current_session.sequence, 2);
        assert_eq!(format_time(state.total.active_time_ms), "15m");
        assert_eq!(format_distance(state.total.distance_meters), "2.00km");
        assert!(state.total.area_square_meters > 0.0);
    }
}
