use serde::{Deserialize, Serialize};

use crate::models::{LatLng, OfferDecision, ReportFormData, ReportStatus};

#[derive(Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<String>,
    pub include_archived: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize)]
pub struct ListBuildingsQuery {
    pub customer_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub status: Option<ReportStatus>,
    #[serde(flatten)]
    pub form: ReportFormData,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ReportStatus,
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub decision: OfferDecision,
}

/// Draft payload as sent by the wizard. `data` is kept exactly as entered;
/// range problems are reported by validation, not repaired.
#[derive(Deserialize)]
pub struct DraftRequest {
    #[serde(default = "first_step")]
    pub step: u8,
    #[serde(default)]
    pub data: ReportFormData,
}

fn first_step() -> u8 {
    1
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDraftRequest {
    /// `draft` or `completed`; defaults to `completed`.
    pub status: Option<ReportStatus>,
    /// Form data to submit instead of the stored draft.
    pub data: Option<ReportFormData>,
}

#[derive(Deserialize)]
pub struct AreaRequest {
    pub points: Vec<LatLng>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
pub struct BranchUpdateRequest {
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSaveResponse {
    pub scheduled: bool,
    pub debounce_ms: u64,
}
