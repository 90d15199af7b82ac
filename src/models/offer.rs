use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

/// A priced quote derived from a report. At most one per report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub report_id: String,
    pub branch_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub title: String,
    pub description: String,
    pub labor_cost: f64,
    pub material_cost: f64,
    pub travel_cost: f64,
    pub overhead_cost: f64,
    pub actions_cost: f64,
    pub subtotal: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub total_amount: f64,
    pub currency: String,
    pub valid_until: NaiveDate,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// Status as seen on `today`: a pending offer past its validity reads as expired.
    pub fn effective_status(&self, today: NaiveDate) -> OfferStatus {
        if self.status == OfferStatus::Pending && today > self.valid_until {
            OfferStatus::Expired
        } else {
            self.status
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferDecision {
    Accept,
    Reject,
}
