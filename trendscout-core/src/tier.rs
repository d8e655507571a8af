use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Pushed to the notifier.
    High,
    Medium,
    Low,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierCutoffs {
    pub high: u8,
    pub medium: u8,
}

impl Default for TierCutoffs {
    fn default() -> Self {
        Self { high: 8, medium: 6 }
    }
}

impl TierCutoffs {
    pub fn classify(&self, score: u8) -> Tier {
        if score >= self.high {
            Tier::High
        } else if score >= self.medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}
