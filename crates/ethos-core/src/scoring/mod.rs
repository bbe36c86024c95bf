//! Scoring engine.
//!
//! Pure, deterministic functions with no I/O:
//!
//! - `feedback`: per-choice message selection from a raw EVS
//! - `tactic`: category to tactic-family lookup
//! - `rating`: performance band for a scaled session score
//! - `scale`: min-max normalisation of a session's EVS history

mod feedback;
mod rating;
mod scale;
mod tactic;

pub use feedback::{FeedbackTier, classify};
pub use rating::{PerformanceRating, performance_rating};
pub use scale::{MAX_EVS, MIN_EVS, NEUTRAL_SCORE, ScaledScore, scale_session};
pub use tactic::{
    PERSUASIVE_RHETORIC, PROCESS_BASED_ADVOCACY, SOFT_RESISTANCE, TacticType, is_known_tactic,
    tactic_type,
};
