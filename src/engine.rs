//! # Statistics Engine
//!
//! Turns samples into lifetime and session aggregates.
//!
//! Every operation takes an [`EngineState`] by reference and returns a new value;
//! the input is never mutated. Callers own the state and serialize writers.
//!
//! ## Entry points
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`create_initial_state`] | Zeroed, initialized state with a fresh session |
//! | [`calculate_totals_from_history`] | Rebuild a state from an ordered history |
//! | [`increment_stats`] | Extend a state by one sample |
//! | [`try_increment_stats`] | Same, reporting why a sample was rejected |
//! | [`increment_stats_filtered`] | Consult a [`DeduplicationFilter`] first |
//! | [`reset_all_stats`] | Back to a fresh initial state |
//! | [`restore_from_totals`] | Seed lifetime totals from persistence |
//!
//! Both the batch and incremental paths push every adjacent pair through
//! [`classify_pair`] and [`segment_area`], so replaying a history one sample at a
//! time yields the same totals as recomputing it.

use log::{debug, info, warn};

use crate::area::segment_area;
use crate::connectivity::{classify_pair, Connectivity};
use crate::error::SampleRejection;
use crate::session::{now_ms, SessionMeta};
use crate::{AccumulatedTotals, GeoSample, StatsConfig};

// ============================================================================
// State
// ============================================================================

/// Snapshot of everything the engine knows.
///
/// `EngineState::default()` is the *uninitialized* state: incremental updates
/// against it are refused until it is replaced by [`create_initial_state`] or a
/// batch recompute.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineState {
    /// Lifetime totals; only reset explicitly
    pub total: AccumulatedTotals,
    /// Totals for [`EngineState::current_session`]
    pub session: AccumulatedTotals,
    pub current_session: SessionMeta,
    /// Most recently accepted sample
    pub last_processed_point: Option<GeoSample>,
    pub is_initialized: bool,
}

/// Upstream gate deciding whether a raw fix reaches the engine at all.
///
/// The engine still validates and filters whatever the gate lets through.
/// Closures of the form `FnMut(&GeoSample) -> bool` implement it directly.
pub trait DeduplicationFilter {
    fn should_process(&mut self, sample: &GeoSample) -> bool;
}

impl<F> DeduplicationFilter for F
where
    F: FnMut(&GeoSample) -> bool,
{
    fn should_process(&mut self, sample: &GeoSample) -> bool {
        self(sample)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Fresh initialized state whose session starts now.
///
/// # Example
///
/// ```rust
/// use exploration_stats::create_initial_state;
///
/// let state = create_initial_state();
/// assert!(state.is_initialized);
/// assert!(state.last_processed_point.is_none());
/// assert_eq!(state.total.distance_meters, 0.0);
/// ```
pub fn create_initial_state() -> EngineState {
    create_initial_state_at(now_ms())
}

/// Fresh initialized state whose session starts at `now_ms`.
pub fn create_initial_state_at(now_ms: i64) -> EngineState {
    EngineState {
        total: AccumulatedTotals::default(),
        session: AccumulatedTotals::default(),
        current_session: SessionMeta::begin(1, now_ms),
        last_processed_point: None,
        is_initialized: true,
    }
}

/// Discard everything, including lifetime totals.
pub fn reset_all_stats() -> EngineState {
    info!("[StatsEngine] Resetting all statistics");
    create_initial_state()
}

/// Initialized state carrying lifetime totals loaded by the persistence layer.
///
/// The session starts now with zeroed session totals.
pub fn restore_from_totals(total: AccumulatedTotals) -> EngineState {
    EngineState {
        total,
        ..create_initial_state()
    }
}

// ============================================================================
// Sample Screening
// ============================================================================

/// Checks that depend only on the sample and the previously accepted one.
pub(crate) fn screen_sample(
    last: Option<&GeoSample>,
    sample: &GeoSample,
) -> Result<(), SampleRejection> {
    if !sample.is_valid() {
        return Err(SampleRejection::invalid(sample));
    }
    check_order(last, sample)
}

fn check_order(last: Option<&GeoSample>, sample: &GeoSample) -> Result<(), SampleRejection> {
    match last {
        Some(prev) if sample.timestamp_ms < prev.timestamp_ms => Err(SampleRejection::OutOfOrder {
            timestamp_ms: sample.timestamp_ms,
            last_timestamp_ms: prev.timestamp_ms,
        }),
        _ => Ok(()),
    }
}

/// Everything that can refuse a sample against `state`.
fn check_sample(state: &EngineState, sample: &GeoSample) -> Result<(), SampleRejection> {
    if !state.is_initialized {
        return Err(SampleRejection::Uninitialized);
    }
    if !sample.is_valid() {
        return Err(SampleRejection::invalid(sample));
    }

    // Checked before ordering: anything older than an ended session is stale
    let session = &state.current_session;
    if !session.is_active() && sample.timestamp_ms < session.start_time_ms {
        return Err(SampleRejection::StaleSample {
            timestamp_ms: sample.timestamp_ms,
            session_start_ms: session.start_time_ms,
            session_id: session.session_id.clone(),
        });
    }

    check_order(state.last_processed_point.as_ref(), sample)
}

// ============================================================================
// Accrual
// ============================================================================

/// Apply an already-checked sample in place.
fn apply_sample(state: &mut EngineState, sample: GeoSample, config: &StatsConfig) {
    if let Some(prev) = state.last_processed_point {
        let pair = classify_pair(&prev, &sample, config);

        if pair.connectivity == Connectivity::NewSession {
            let next_session = state.current_session.successor(sample.timestamp_ms);
            debug!(
                "[StatsEngine] Gap of {}ms closes session #{}; opening #{}",
                pair.elapsed_ms, state.current_session.sequence, next_session.sequence
            );
            state.current_session = next_session;
            state.session = AccumulatedTotals::default();
        } else {
            let distance = pair.accrued_distance();
            let area = segment_area(&pair, config);
            let time = pair.accrued_time_ms();
            state.total.accrue(distance, area, time);
            state.session.accrue(distance, area, time);
        }
    }

    state.last_processed_point = Some(sample);
}

/// Extend `state` by one sample, or say why the sample was refused.
///
/// On `Err` the input state is untouched.
pub fn try_increment_stats(
    state: &EngineState,
    sample: GeoSample,
    config: &StatsConfig,
) -> Result<EngineState, SampleRejection> {
    check_sample(state, &sample)?;

    let mut next = state.clone();
    apply_sample(&mut next, sample, config);
    Ok(next)
}

/// Extend `state` by one sample.
///
/// Rejected samples (invalid coordinates, uninitialized state, stale or
/// out-of-order timestamps) are logged and the input state is returned unchanged.
///
/// # Example
///
/// ```rust
/// use exploration_stats::{GeoSample, StatsConfig, create_initial_state, increment_stats};
///
/// let config = StatsConfig::default();
/// let state = create_initial_state();
/// let state = increment_stats(&state, GeoSample::new(51.5000, -0.1200, 0), &config);
/// let state = increment_stats(&state, GeoSample::new(51.5010, -0.1200, 30_000), &config);
///
/// assert!(state.total.distance_meters > 100.0);
/// assert_eq!(state.total.active_time_ms, 30_000);
/// ```
pub fn increment_stats(state: &EngineState, sample: GeoSample, config: &StatsConfig) -> EngineState {
    match try_increment_stats(state, sample, config) {
        Ok(next) => next,
        Err(rejection) => {
            warn!("[StatsEngine] Ignoring sample: {}", rejection);
            state.clone()
        }
    }
}

/// Extend `state` by one sample if `filter` lets it through.
pub fn increment_stats_filtered<F>(
    state: &EngineState,
    sample: GeoSample,
    filter: &mut F,
    config: &StatsConfig,
) -> EngineState
where
    F: DeduplicationFilter + ?Sized,
{
    if !filter.should_process(&sample) {
        debug!(
            "[StatsEngine] {}",
            SampleRejection::Filtered { timestamp_ms: sample.timestamp_ms }
        );
        return state.clone();
    }
    increment_stats(state, sample, config)
}

// ============================================================================
// Batch Recompute
// ============================================================================

/// Rebuild a state from a complete, chronologically ordered history.
///
/// Invalid and out-of-order samples are dropped with a warning. The result has the
/// same totals as folding [`increment_stats`] over `samples` from
/// [`create_initial_state`].
///
/// # Example
///
/// ```rust
/// use exploration_stats::{GeoSample, StatsConfig, calculate_totals_from_history};
///
/// let history = vec![
///     GeoSample::new(51.5000, -0.1200, 0),
///     GeoSample::new(51.5005, -0.1200, 20_000),
///     GeoSample::new(51.5010, -0.1200, 40_000),
/// ];
///
/// let state = calculate_totals_from_history(&history, &StatsConfig::default());
/// assert!(state.is_initialized);
/// assert_eq!(state.total.active_time_ms, 40_000);
/// assert_eq!(state.last_processed_point, history.last().copied());
/// ```
pub fn calculate_totals_from_history(samples: &[GeoSample], config: &StatsConfig) -> EngineState {
    let state = recompute(samples, config);

    info!(
        "[StatsEngine] Recomputed {} samples: {:.0}m, {:.0}m², {}ms over {} session(s)",
        samples.len(),
        state.total.distance_meters,
        state.total.area_square_meters,
        state.total.active_time_ms,
        state.current_session.sequence
    );

    state
}

#[cfg(not(feature = "parallel"))]
fn recompute(samples: &[GeoSample], config: &StatsConfig) -> EngineState {
    let mut state = create_initial_state();

    for sample in samples {
        match check_sample(&state, sample) {
            Ok(()) => apply_sample(&mut state, *sample, config),
            Err(rejection) => warn!("[StatsEngine] Dropping sample: {}", rejection),
        }
    }

    state
}

/// Sessions are summed independently, then folded in order.
#[cfg(feature = "parallel")]
fn recompute(samples: &[GeoSample], config: &StatsConfig) -> EngineState {
    let initial = create_initial_state();
    let (accepted, sessions) = crate::session::partition_screened(samples, config);

    let Some(last_session) = sessions.last() else {
        return initial;
    };

    let mut total = AccumulatedTotals::default();
    for s in &sessions {
        total += s.totals;
    }

    let current_session = if sessions.len() > 1 {
        SessionMeta::begin(last_session.sequence, last_session.start_time_ms)
    } else {
        initial.current_session
    };

    EngineState {
        total,
        session: last_session.totals,
        current_session,
        last_processed_point: accepted.last().copied(),
        is_initialized: true,
    }
}
