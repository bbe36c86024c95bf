//! Session-level performance bands.

use serde::{Deserialize, Serialize};

/// Qualitative label for a scaled 0-10 session score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRating {
    pub rating: String,
    pub description: String,
}

/// Maps a scaled score to its band. Lower bounds are inclusive.
///
/// The `< 0.0` "Ethical Blindspot" band cannot be reached by a clamped
/// session score; it only applies to raw inputs below the scale.
pub fn performance_rating(scaled_score: f64) -> PerformanceRating {
    let (rating, description) = if scaled_score >= 8.0 {
        (
            "Excellent Ethical Advocate",
            "You consistently challenged unethical pressure with effective, principled tactics.",
        )
    } else if scaled_score >= 6.0 {
        (
            "Good Ethical Awareness",
            "You recognised the ethical issue and pushed back, with room to advocate more assertively.",
        )
    } else if scaled_score >= 4.0 {
        (
            "Passive Ethics",
            "You noticed the problem but often avoided confronting it directly.",
        )
    } else if scaled_score >= 0.0 {
        (
            "Ethical Risk Zone",
            "Your responses frequently accommodated the unethical request.",
        )
    } else {
        (
            "Ethical Blindspot",
            "The ethical dimension of the situation went largely unaddressed.",
        )
    };

    PerformanceRating {
        rating: rating.to_string(),
        description: description.to_string(),
    }
}
