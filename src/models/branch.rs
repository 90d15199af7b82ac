use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant unit. Every stored entity belongs to exactly one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
