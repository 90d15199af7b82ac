use serde::{Deserialize, Serialize};
use super::geo::LatLng;

/// Severity of a roof issue, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Lower values sort first. Critical = 0, Low = 3.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Leak,
    Damage,
    Wear,
    Structural,
    Ventilation,
    Gutters,
    Flashing,
    #[default]
    Other,
}

impl IssueType {
    pub fn label(&self) -> &'static str {
        match self {
            IssueType::Leak => "Leak",
            IssueType::Damage => "Damage",
            IssueType::Wear => "Wear",
            IssueType::Structural => "Structural",
            IssueType::Ventilation => "Ventilation",
            IssueType::Gutters => "Gutters",
            IssueType::Flashing => "Flashing",
            IssueType::Other => "Other",
        }
    }
}

/// Pin placed on an uploaded photo, in percent of its width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePin {
    pub x: f64,
    pub y: f64,
}

impl ImagePin {
    pub fn in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Object storage keys of attached photos.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_pin: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pin: Option<ImagePin>,
}

impl Issue {
    pub fn new(issue_type: IssueType, severity: Severity, description: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            issue_type,
            severity,
            description: description.to_string(),
            location: None,
            images: Vec::new(),
            map_pin: None,
            image_pin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_ordering() {
        assert!(Severity::Critical.rank() < Severity::High.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_issue_deserialize_with_defaults() {
        let issue: Issue = serde_json::from_str(r#"{"id": "i-1", "type": "leak"}"#).unwrap();
        assert_eq!(issue.issue_type, IssueType::Leak);
        assert_eq!(issue.severity, Severity::Medium);
        assert!(issue.images.is_empty());
        assert!(issue.map_pin.is_none());
    }

    #[test]
    fn test_image_pin_bounds() {
        assert!(ImagePin { x: 0.0, y: 100.0 }.in_bounds());
        assert!(!ImagePin { x: -1.0, y: 50.0 }.in_bounds());
    }
}
