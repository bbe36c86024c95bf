//! Session-level EVS normalisation.
//!
//! Raw EVS totals are not comparable across sessions of different length,
//! so the total is min-max scaled over the range the session could have
//! produced and mapped onto 0-10.

use serde::{Deserialize, Serialize};

/// Lowest per-choice EVS.
pub const MIN_EVS: f64 = -3.0;
/// Highest per-choice EVS.
pub const MAX_EVS: f64 = 3.0;
/// Scaled score reported for a session without any scored choice.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Intermediate and final values of the scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledScore {
    pub raw_total: f64,
    pub min_possible: f64,
    pub max_possible: f64,
    /// Unrounded, unclamped scaled value
    pub scaled: f64,
    /// Rounded to one decimal and clamped to `[0, 10]`
    pub final_score: f64,
}

/// Scales a session's per-choice scores onto 0-10.
pub fn scale_session(evs: &[f64]) -> ScaledScore {
    let n = evs.len() as f64;
    let raw_total: f64 = evs.iter().sum();
    let min_possible = n * MIN_EVS;
    let max_possible = n * MAX_EVS;

    let scaled = if max_possible == min_possible {
        NEUTRAL_SCORE
    } else {
        ((raw_total - min_possible) / (max_possible - min_possible)) * 10.0
    };

    ScaledScore {
        raw_total,
        min_possible,
        max_possible,
        scaled,
        final_score: round_to_tenth(scaled).clamp(0.0, 10.0),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
