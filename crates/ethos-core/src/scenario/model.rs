//! Scenario domain model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Adversarial persona that frames the scenario's ethical pressure.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ManagerType {
    #[serde(alias = "puppeteer", alias = "Puppeteer")]
    Puppeteer,
    #[serde(alias = "diluter", alias = "Diluter")]
    Diluter,
    #[serde(alias = "camouflager", alias = "Camouflager")]
    Camouflager,
}

impl ManagerType {
    /// Canned blurb describing the persona's pressure style.
    pub fn description(self) -> &'static str {
        match self {
            ManagerType::Puppeteer => {
                "The Puppeteer pulls strings from behind the scenes, using authority and \
                 implied consequences to steer you into doing what they want."
            }
            ManagerType::Diluter => {
                "The Diluter downplays the ethical concern, framing it as minor, routine, \
                 or something everyone already does."
            }
            ManagerType::Camouflager => {
                "The Camouflager disguises the unethical request as a reasonable business \
                 need, hiding its real nature behind neutral language."
            }
        }
    }
}

/// Immutable descriptor of a practice scenario.
///
/// Created once when a session starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Topic tag (e.g. "privacy", "accessibility")
    pub issue: String,
    pub manager_type: ManagerType,
}

/// How the user picks what to practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartTarget {
    /// An explicitly chosen scenario id.
    Scenario(String),
    /// Free-text query; the scenario service suggests a scenario.
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn manager_type_parses_case_insensitively() {
        assert_eq!(ManagerType::from_str("PUPPETEER").unwrap(), ManagerType::Puppeteer);
        assert_eq!(ManagerType::from_str("diluter").unwrap(), ManagerType::Diluter);
        assert!(ManagerType::from_str("BULLY").is_err());
        assert_eq!(ManagerType::Camouflager.to_string(), "CAMOUFLAGER");
    }

    #[test]
    fn manager_type_wire_format_is_uppercase() {
        let json = serde_json::to_string(&ManagerType::Diluter).unwrap();
        assert_eq!(json, "\"DILUTER\"");
        let parsed: ManagerType = serde_json::from_str("\"puppeteer\"").unwrap();
        assert_eq!(parsed, ManagerType::Puppeteer);
    }

    #[test]
    fn every_manager_type_has_a_blurb() {
        for manager in ManagerType::iter() {
            assert!(manager.description().starts_with(&format!("The {manager:?}")));
        }
    }
}
