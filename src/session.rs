//! # Session Management
//!
//! A session is a maximal run of samples in which every adjacent pair stays within
//! the session gap threshold. Sessions end in two ways:
//!
//! - **Implicitly**, when a sample arrives more than
//!   [`StatsConfig::session_gap_threshold_ms`] after the previous one. The engine
//!   opens a successor session whose start is that sample's timestamp.
//! - **Explicitly**, through [`end_current_session`] / [`start_new_session`] when
//!   the host pauses and resumes tracking.
//!
//! The session counter lives in [`SessionMeta::sequence`] and is threaded through
//! [`EngineState`]; there is no process-wide counter.

use std::ops::Range;

use log::{debug, info, warn};

use crate::area::segment_area;
use crate::connectivity::classify_pair;
use crate::geo_utils::elapsed_ms;
use crate::engine::{screen_sample, EngineState};
use crate::{AccumulatedTotals, GeoSample, StatsConfig};

// ============================================================================
// Types
// ============================================================================

/// Identity and lifetime of one session.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionMeta {
    /// Opaque unique identifier (UUID v4)
    pub session_id: String,
    /// 1 for the first session after initialization or reset, +1 per boundary
    pub sequence: u32,
    /// Wall-clock start for explicit sessions, first sample time for gap-opened ones
    pub start_time_ms: i64,
    /// Set by [`end_current_session`]; `None` while the session is active
    pub end_time_ms: Option<i64>,
}

impl SessionMeta {
    /// Mint a fresh, active session.
    pub fn begin(sequence: u32, start_time_ms: i64) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            start_time_ms,
            end_time_ms: None,
        }
    }

    /// The session that follows this one.
    pub fn successor(&self, start_time_ms: i64) -> Self {
        Self::begin(self.sequence.saturating_add(1), start_time_ms)
    }

    pub fn is_active(&self) -> bool {
        self.end_time_ms.is_none()
    }
}

/// Aggregates for one session detected in a history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSummary {
    /// Position of the session in the history, starting at 1
    pub sequence: u32,
    /// Timestamp of the first sample in the session
    pub start_time_ms: i64,
    /// Timestamp of the last sample in the session
    pub end_time_ms: i64,
    pub sample_count: u32,
    pub totals: AccumulatedTotals,
}

// ============================================================================
// Explicit Lifecycle
// ============================================================================

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Begin a new session now. See [`start_new_session_at`].
pub fn start_new_session(state: &EngineState) -> EngineState {
    start_new_session_at(state, now_ms())
}

/// Begin a new session at `now_ms`.
///
/// Zeroes the session totals and mints a new session id; lifetime totals are
/// untouched. The last processed point is cleared so nothing is attributed across
/// the pause.
pub fn start_new_session_at(state: &EngineState, now_ms: i64) -> EngineState {
    let mut next = state.clone();
    next.session = AccumulatedTotals::default();
    next.current_session = state.current_session.successor(now_ms);
    next.last_processed_point = None;

    info!(
        "[SessionManager] Started session #{} ({}) at {}",
        next.current_session.sequence, next.current_session.session_id, now_ms
    );
    next
}

/// End the current session now. See [`end_current_session_at`].
pub fn end_current_session(state: &EngineState) -> EngineState {
    end_current_session_at(state, now_ms())
}

/// Mark the current session as ended at `now_ms`. Totals are untouched.
pub fn end_current_session_at(state: &EngineState, now_ms: i64) -> EngineState {
    let mut next = state.clone();
    next.current_session.end_time_ms = Some(now_ms);

    info!(
        "[SessionManager] Ended session #{} ({}) at {}: {:.0}m, {}ms active",
        next.current_session.sequence,
        next.current_session.session_id,
        now_ms,
        next.session.distance_meters,
        next.session.active_time_ms
    );
    next
}

// ============================================================================
// History Partitioning
// ============================================================================

/// Drop invalid and out-of-order samples, logging each rejection.
pub(crate) fn screen_history(samples: &[GeoSample]) -> Vec<GeoSample> {
    let mut accepted: Vec<GeoSample> = Vec::with_capacity(samples.len());

    for sample in samples {
        match screen_sample(accepted.last(), sample) {
            Ok(()) => accepted.push(*sample),
            Err(rejection) => warn!("[SessionManager] Dropping sample: {}", rejection),
        }
    }

    accepted
}

/// Index ranges of each session in an already-screened sample list.
fn session_ranges(samples: &[GeoSample], config: &StatsConfig) -> Vec<Range<usize>> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut start = 0;

    for (i, w) in samples.windows(2).enumerate() {
        // Boundaries depend only on the gap, so no distance math is needed here
        if elapsed_ms(&w[0], &w[1]) > config.session_gap_threshold_ms {
            ranges.push(start..i + 1);
            start = i + 1;
        }
    }
    ranges.push(start..samples.len());

    ranges
}

/// Sum one session's pairs.
fn summarize_session(samples: &[GeoSample], sequence: u32, config: &StatsConfig) -> SessionSummary {
    let mut totals = AccumulatedTotals::default();

    for w in samples.windows(2) {
        let pair = classify_pair(&w[0], &w[1], config);
        totals.accrue(pair.accrued_distance(), segment_area(&pair, config), pair.accrued_time_ms());
    }

    SessionSummary {
        sequence,
        start_time_ms: samples.first().map_or(0, |s| s.timestamp_ms),
        end_time_ms: samples.last().map_or(0, |s| s.timestamp_ms),
        sample_count: u32::try_from(samples.len()).unwrap_or(u32::MAX),
        totals,
    }
}

/// 1-based session sequence for the `index`th session of a history.
fn sequence_for(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}

/// Screen a history and split it into sessions with per-session totals.
///
/// Returns the accepted samples alongside the summaries.
pub(crate) fn partition_screened(
    samples: &[GeoSample],
    config: &StatsConfig,
) -> (Vec<GeoSample>, Vec<SessionSummary>) {
    let accepted = screen_history(samples);
    let ranges = session_ranges(&accepted, config);

    #[cfg(feature = "parallel")]
    let summaries: Vec<SessionSummary> = {
        use rayon::prelude::*;
        ranges
            .into_par_iter()
            .enumerate()
            .map(|(i, r)| summarize_session(&accepted[r], sequence_for(i), config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let summaries: Vec<SessionSummary> = ranges
        .into_iter()
        .enumerate()
        .map(|(i, r)| summarize_session(&accepted[r], sequence_for(i), config))
        .collect();

    debug!(
        "[SessionManager] Partitioned {} samples into {} sessions",
        accepted.len(),
        summaries.len()
    );

    (accepted, summaries)
}

/// Split an ordered history into sessions.
///
/// Invalid and out-of-order samples are dropped with a warning, exactly as
/// [`crate::calculate_totals_from_history`] drops them. The sum of the returned
/// totals equals the lifetime totals of a batch recompute.
///
/// # Example
///
/// ```rust
/// use exploration_stats::{GeoSample, StatsConfig, partition_sessions};
///
/// let history = vec![
///     GeoSample::new(51.5000, -0.1200, 0),
///     GeoSample::new(51.5010, -0.1200, 60_000),
///     // 30 minute gap
///     GeoSample::new(51.5010, -0.1200, 1_860_000),
///     GeoSample::new(51.5020, -0.1200, 1_920_000),
/// ];
///
/// let sessions = partition_sessions(&history, &StatsConfig::default());
/// assert_eq!(sessions.len(), 2);
/// assert_eq!(sessions[1].totals.active_time_ms, 60_000);
/// ```
pub fn partition_sessions(samples: &[GeoSample], config: &StatsConfig) -> Vec<SessionSummary> {
    partition_screened(samples, config).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::create_initial_state_at;

    fn walk(start_ms: i64, count: usize, step_ms: i64) -> Vec<GeoSample> {
        // ~22m north per step
        (0..count)
            .map(|i| GeoSample::new(37.7749 + i as f64 * 0.0002, -122.4194, start_ms + i as i64 * step_ms))
            .collect()
    }

    #[test]
    fn test_session_meta_successor() {
        let first = SessionMeta::begin(1, 100);
        let second = first.successor(200);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.start_time_ms, 200);
        assert!(second.is_active());
        assert_ne!(first.session_id, second.session_id);
    }

    #[test]
    fn test_start_new_session_keeps_lifetime_totals() {
        let mut state = create_initial_state_at(0);
        state.total.accrue(500.0, 10_000.0, 60_000);
        state.session.accrue(200.0, 4_000.0, 30_000);
        state.last_processed_point = Some(GeoSample::new(1.0, 1.0, 50));

        let resumed = start_new_session_at(&state, 1_000);
        assert_eq!(resumed.total, state.total);
        assert_eq!(resumed.session, AccumulatedTotals::default());
        assert_eq!(resumed.current_session.start_time_ms, 1_000);
        assert_eq!(resumed.current_session.sequence, state.current_session.sequence + 1);
        assert!(resumed.current_session.is_active());
        assert!(resumed.last_processed_point.is_none());
    }

    #[test]
    fn test_end_current_session() {
        let mut state = create_initial_state_at(0);
        state.total.accrue(500.0, 10_000.0, 60_000);

        let ended = end_current_session_at(&state, 9_000);
        assert_eq!(ended.current_session.end_time_ms, Some(9_000));
        assert_eq!(ended.current_session.session_id, state.current_session.session_id);
        assert_eq!(ended.total, state.total);
        assert_eq!(ended.session, state.session);
    }

    #[test]
    fn test_partition_single_session() {
        let history = walk(0, 5, 10_000);
        let sessions = partition_sessions(&history, &StatsConfig::default());
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].sample_count, 5);
        assert_eq!(sessions[0].totals.active_time_ms, 40_000);
        assert!(sessions[0].totals.distance_meters > 80.0);
    }

    #[test]
    fn test_partition_sum_of_spans() {
        let mut history = walk(0, 4, 20_000);
        history.extend(walk(3_600_000, 3, 15_000));
        history.extend(walk(10_000_000, 6, 5_000));

        let sessions = partition_sessions(&history, &StatsConfig::default());
        assert_eq!(sessions.len(), 3);
        for (i, s) in sessions.iter().enumerate() {
            assert_eq!(s.sequence, i as u32 + 1);
            assert_eq!(s.totals.active_time_ms, s.end_time_ms - s.start_time_ms);
        }
        let total: i64 = sessions.iter().map(|s| s.totals.active_time_ms).sum();
        assert_eq!(total, 60_000 + 30_000 + 25_000);
    }

    #[test]
    fn test_partition_drops_invalid_samples() {
        let mut history = walk(0, 3, 10_000);
        history.insert(1, GeoSample::new(f64::NAN, 0.0, 5_000));
        history.push(GeoSample::new(0.0, 200.0, 40_000));

        let sessions = partition_sessions(&history, &StatsConfig::default());
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].sample_count, 3);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_sessions(&[], &StatsConfig::default()).is_empty());
    }

    #[test]
    fn test_partition_extreme_timestamps() {
        let history = vec![
            GeoSample::new(37.7749, -122.4194, i64::MIN),
            GeoSample::new(37.7749, -122.4194, i64::MAX),
        ];
        let sessions = partition_sessions(&history, &StatsConfig::default());
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].sequence, 2);
        assert_eq!(sessions[1].start_time_ms, i64::MAX);
        assert!(sessions.iter().all(|s| s.totals.active_time_ms == 0));
    }

    #[test]
    fn test_sequence_and_count_saturate() {
        assert_eq!(sequence_for(0), 1);
        assert_eq!(sequence_for(4), 5);
        assert_eq!(sequence_for(u32::MAX as usize), u32::MAX);
        assert_eq!(summarize_session(&walk(0, 3, 1_000), 7, &StatsConfig::default()).sample_count, 3);
    }
}
