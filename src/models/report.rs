use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::action::RecommendedAction;
use super::customer::CustomerType;
use super::geo::LatLng;
use super::issue::Issue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Draft,
    Completed,
    Sent,
    Shared,
    Archived,
    OfferSent,
    OfferAccepted,
    OfferRejected,
    OfferExpired,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
            Self::Sent => "sent",
            Self::Shared => "shared",
            Self::Archived => "archived",
            Self::OfferSent => "offer_sent",
            Self::OfferAccepted => "offer_accepted",
            Self::OfferRejected => "offer_rejected",
            Self::OfferExpired => "offer_expired",
        }
    }

    pub fn is_offer(&self) -> bool {
        matches!(
            self,
            Self::OfferSent | Self::OfferAccepted | Self::OfferRejected | Self::OfferExpired
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown report status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    Tile,
    Metal,
    Shingle,
    Slate,
    Flat,
    Other,
}

impl RoofType {
    pub fn label(&self) -> &'static str {
        match self {
            RoofType::Tile => "Tile",
            RoofType::Metal => "Metal",
            RoofType::Shingle => "Shingle",
            RoofType::Slate => "Slate",
            RoofType::Flat => "Flat roof",
            RoofType::Other => "Other",
        }
    }
}

/// Cost fields entered on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    #[serde(default)]
    pub labor_cost: f64,
    #[serde(default)]
    pub material_cost: f64,
    #[serde(default)]
    pub travel_cost: f64,
    #[serde(default)]
    pub overhead_cost: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.labor_cost + self.material_cost + self.travel_cost + self.overhead_cost
    }
}

/// The primary inspection record authored by an inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub branch_id: String,
    pub created_by: String,

    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_type: CustomerType,

    pub building_id: Option<String>,
    pub building_address: Option<String>,

    pub inspection_date: NaiveDate,
    pub roof_type: RoofType,
    pub roof_age: Option<i32>,
    pub roof_size_m2: Option<f64>,
    pub roof_outline: Vec<LatLng>,
    /// Storage key of the map snapshot taken when the outline was drawn.
    pub roof_snapshot: Option<String>,
    pub condition_notes: String,

    pub issues_found: Vec<Issue>,
    pub recommended_actions: Vec<RecommendedAction>,

    #[serde(flatten)]
    pub costs: CostBreakdown,
    pub total_cost: f64,

    pub status: ReportStatus,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
}

impl Report {
    pub fn issue_mut(&mut self, issue_id: &str) -> Option<&mut Issue> {
        self.issues_found.iter_mut().find(|i| i.id == issue_id)
    }

    pub fn recompute_total(&mut self) {
        self.total_cost = self.costs.total();
    }
}
