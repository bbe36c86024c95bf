//! Tactic taxonomy.
//!
//! Every choice offered to the user carries a tactic category. Categories
//! fall into three disjoint families; anything outside them is reported with
//! the generic "Tactic" label.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Categories that persuade the manager by argument.
pub const PERSUASIVE_RHETORIC: [&str; 8] = [
    "Appeal to Values",
    "Appeal to Reputation",
    "Appeal to Consequences",
    "Appeal to Authority",
    "Reframing",
    "Storytelling",
    "Social Proof",
    "Reciprocity",
];

/// Categories that lean on procedure, policy, or third parties.
pub const PROCESS_BASED_ADVOCACY: [&str; 8] = [
    "Escalation",
    "Documentation",
    "Policy Reference",
    "Involve Compliance",
    "Request Review",
    "Propose Alternative",
    "Seek Clarification",
    "Coalition Building",
];

/// Categories that resist without open confrontation.
pub const SOFT_RESISTANCE: [&str; 8] = [
    "Deflection",
    "Strategic Delay",
    "Polite Refusal",
    "Feigned Ignorance",
    "Partial Compliance",
    "Redirection",
    "Probing Questions",
    "Humor",
];

/// Broad family a tactic category belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum TacticType {
    #[strum(to_string = "Persuasive Rhetoric")]
    #[serde(rename = "Persuasive Rhetoric")]
    PersuasiveRhetoric,
    #[strum(to_string = "Process-Based Advocacy")]
    #[serde(rename = "Process-Based Advocacy")]
    ProcessBasedAdvocacy,
    #[strum(to_string = "Soft Resistance")]
    #[serde(rename = "Soft Resistance")]
    SoftResistance,
    #[strum(to_string = "Tactic")]
    #[serde(rename = "Tactic")]
    Generic,
}

impl TacticType {
    /// Categories that map to this family. Empty for the generic label.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            TacticType::PersuasiveRhetoric => &PERSUASIVE_RHETORIC,
            TacticType::ProcessBasedAdvocacy => &PROCESS_BASED_ADVOCACY,
            TacticType::SoftResistance => &SOFT_RESISTANCE,
            TacticType::Generic => &[],
        }
    }
}

/// Maps a category to its tactic family.
///
/// Matching is exact and case-sensitive.
pub fn tactic_type(category: &str) -> TacticType {
    if PERSUASIVE_RHETORIC.contains(&category) {
        TacticType::PersuasiveRhetoric
    } else if PROCESS_BASED_ADVOCACY.contains(&category) {
        TacticType::ProcessBasedAdvocacy
    } else if SOFT_RESISTANCE.contains(&category) {
        TacticType::SoftResistance
    } else {
        TacticType::Generic
    }
}

/// Returns true if the category is part of the fixed taxonomy.
pub fn is_known_tactic(category: &str) -> bool {
    tactic_type(category) != TacticType::Generic
}
