//! JSON codec for lifetime totals.
//!
//! The host stores only [`AccumulatedTotals`] across restarts; session state is
//! rebuilt live. On launch the host decodes the stored blob and hands it to
//! [`restore_state`].

use log::info;

use crate::engine::{restore_from_totals, EngineState};
use crate::error::PersistenceError;
use crate::AccumulatedTotals;

/// Encode lifetime totals for storage.
pub fn totals_to_json(totals: &AccumulatedTotals) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(totals)?)
}

/// Decode lifetime totals, refusing values no engine could have produced.
pub fn totals_from_json(json: &str) -> Result<AccumulatedTotals, PersistenceError> {
    let totals: AccumulatedTotals = serde_json::from_str(json)?;

    if !totals.distance_meters.is_finite() || totals.distance_meters < 0.0 {
        return Err(PersistenceError::Corrupt(format!(
            "distance_meters = {}",
            totals.distance_meters
        )));
    }
    if !totals.area_square_meters.is_finite() || totals.area_square_meters < 0.0 {
        return Err(PersistenceError::Corrupt(format!(
            "area_square_meters = {}",
            totals.area_square_meters
        )));
    }
    if totals.active_time_ms < 0 {
        return Err(PersistenceError::Corrupt(format!(
            "active_time_ms = {}",
            totals.active_time_ms
        )));
    }

    Ok(totals)
}

/// Decode stored totals into a ready-to-use engine state.
pub fn restore_state(json: &str) -> Result<EngineState, PersistenceError> {
    let totals = totals_from_json(json)?;
    info!(
        "[Persistence] Restored lifetime totals: {:.0}m, {:.0}m², {}ms",
        totals.distance_meters, totals.area_square_meters, totals.active_time_ms
    );
    Ok(restore_from_totals(totals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_state_from_stored_totals() {
        let totals = AccumulatedTotals {
            distance_meters: 8_250.5,
            area_square_meters: 165_010.0,
            active_time_ms: 5_400_000,
        };
        let json = totals_to_json(&totals).unwrap();
        let state = restore_state(&json).unwrap();

        assert!(state.is_initialized);
        assert_eq!(state.total, totals);
        assert_eq!(state.session, AccumulatedTotals::default());
    }

    #[test]
    fn test_rejects_negative_totals() {
        let json = r#"{"distance_meters":-1.0,"area_square_meters":0.0,"active_time_ms":0}"#;
        assert!(matches!(totals_from_json(json), Err(PersistenceError::Corrupt(_))));

        let json = r#"{"distance_meters":1.0,"area_square_meters":0.0,"active_time_ms":-5}"#;
        assert!(matches!(totals_from_json(json), Err(PersistenceError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(totals_from_json("{not json"), Err(PersistenceError::Json(_))));
    }
}
