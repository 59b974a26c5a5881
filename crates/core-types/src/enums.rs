use serde::{Deserialize, Serialize};

/// One point of a three-point (min / most-likely / max) estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Min,
    MostLikely,
    Max,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 3] = [Tier::Min, Tier::MostLikely, Tier::Max];

    /// Column label used in tables and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Min => "Min",
            Tier::MostLikely => "Most Likely",
            Tier::Max => "Max",
        }
    }
}
