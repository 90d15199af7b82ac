use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    #[default]
    ShortTerm,
    LongTerm,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Immediate => "Immediate",
            Urgency::ShortTerm => "Within 1-2 years",
            Urgency::LongTerm => "Long term",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

/// Sum of the estimates that are present.
pub fn total_estimated_cost(actions: &[RecommendedAction]) -> f64 {
    actions.iter().filter_map(|a| a.estimated_cost).sum()
}
