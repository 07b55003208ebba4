//! Connectivity classification for adjacent sample pairs.
//!
//! Every pair of chronologically adjacent samples falls into exactly one
//! [`Connectivity`] class. The order of checks matters:
//!
//! 1. Gap longer than the session threshold → [`Connectivity::NewSession`]
//! 2. Distance under the jitter floor → [`Connectivity::Stationary`]
//! 3. Distance over the jump cap, or speed over the ceiling → [`Connectivity::Implausible`]
//! 4. Otherwise → [`Connectivity::Movement`]
//!
//! Only `Movement` accrues distance and area. The three same-session classes all
//! keep the elapsed time of the pair inside the session span.

use log::debug;

use crate::geo_utils::{elapsed_ms, haversine_distance, implied_speed_mps};
use crate::{GeoSample, StatsConfig};

/// Outcome of classifying one adjacent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Plausible continuous movement. Distance and area accrue.
    Movement,
    /// Positional jitter below the movement floor.
    Stationary,
    /// Same session, but the fix implies a jump or speed no explorer makes.
    Implausible,
    /// The gap exceeds the session threshold; `next` opens a new session.
    NewSession,
}

impl Connectivity {
    /// True for every class except [`Connectivity::NewSession`].
    pub fn is_same_session(self) -> bool {
        !matches!(self, Connectivity::NewSession)
    }

    /// True when distance and area accrue for the pair.
    pub fn accrues_distance(self) -> bool {
        matches!(self, Connectivity::Movement)
    }
}

/// A classified pair together with the measurements the decision was based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairClassification {
    pub connectivity: Connectivity,
    /// Great-circle distance between the two samples in meters
    pub distance_meters: f64,
    /// `next.timestamp_ms - prev.timestamp_ms`, saturating at the `i64` bounds
    pub elapsed_ms: i64,
}

impl PairClassification {
    /// Distance that counts toward totals: the measured distance for movement, else 0.
    pub fn accrued_distance(&self) -> f64 {
        if self.connectivity.accrues_distance() {
            self.distance_meters
        } else {
            0.0
        }
    }

    /// Time that counts toward the session span: the interval for same-session pairs, else 0.
    pub fn accrued_time_ms(&self) -> i64 {
        if self.connectivity.is_same_session() {
            self.elapsed_ms.max(0)
        } else {
            0
        }
    }
}

/// Classify two validated, chronologically ordered samples.
///
/// # Example
///
/// ```rust
/// use exploration_stats::{GeoSample, StatsConfig, Connectivity, classify_pair};
///
/// let a = GeoSample::new(51.5000, -0.1200, 0);
/// let b = GeoSample::new(51.5010, -0.1200, 30_000); // ~111m in 30s
///
/// let pair = classify_pair(&a, &b, &StatsConfig::default());
/// assert_eq!(pair.connectivity, Connectivity::Movement);
/// ```
pub fn classify_pair(prev: &GeoSample, next: &GeoSample, config: &StatsConfig) -> PairClassification {
    let elapsed_ms = elapsed_ms(prev, next);
    let distance_meters = haversine_distance(prev, next);

    let connectivity = if elapsed_ms > config.session_gap_threshold_ms {
        Connectivity::NewSession
    } else if distance_meters < config.min_movement_meters {
        Connectivity::Stationary
    } else if distance_meters > config.max_plausible_jump_meters
        || implied_speed_mps(distance_meters, elapsed_ms) > config.max_plausible_speed_mps
    {
        debug!(
            "[Connectivity] Implausible pair: {:.0}m in {}ms",
            distance_meters, elapsed_ms
        );
        Connectivity::Implausible
    } else {
        Connectivity::Movement
    };

    PairClassification {
        connectivity,
        distance_meters,
        elapsed_ms,
    }
}
