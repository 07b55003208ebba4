//! Revealed-area estimation.
//!
//! Ground revealed by a connected path is modeled as a fixed-width corridor traced
//! along it: each movement segment contributes `length × corridor width`. The width
//! defaults to twice the fog-reveal radius the map layer draws around the path, so
//! the number and the rendered overlay agree.

use crate::connectivity::PairClassification;
use crate::StatsConfig;

/// Area in m² contributed by one classified pair.
///
/// Zero for anything other than [`crate::Connectivity::Movement`].
#[inline]
pub fn segment_area(pair: &PairClassification, config: &StatsConfig) -> f64 {
    pair.accrued_distance() * config.reveal_corridor_width_meters
}
