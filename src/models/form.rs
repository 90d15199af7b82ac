use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, RoofdeskError};
use super::action::RecommendedAction;
use super::customer::CustomerType;
use super::geo::LatLng;
use super::issue::Issue;
use super::report::{CostBreakdown, Report, ReportStatus, RoofType};

/// In-progress report form state, as edited across the wizard steps.
///
/// Everything is optional or defaulted because a draft may be saved at any
/// point; [`crate::validation`] decides what a given step requires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFormData {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_type: CustomerType,

    pub building_id: Option<String>,
    pub building_address: Option<String>,

    pub inspection_date: Option<NaiveDate>,
    pub roof_type: Option<RoofType>,
    pub roof_age: Option<i32>,
    pub roof_size_m2: Option<f64>,
    pub roof_outline: Vec<LatLng>,
    pub condition_notes: String,

    pub issues_found: Vec<Issue>,
    pub recommended_actions: Vec<RecommendedAction>,

    #[serde(flatten)]
    pub costs: CostBreakdown,
}

impl ReportFormData {
    /// Turn validated form data into a stored report.
    pub fn into_report(
        self,
        branch_id: &str,
        user_id: &str,
        status: ReportStatus,
        now: DateTime<Utc>,
    ) -> Result<Report, RoofdeskError> {
        let mut missing = FieldErrors::new();
        if self.inspection_date.is_none() {
            missing.insert("inspectionDate".into(), "Inspection date is required".into());
        }
        if self.roof_type.is_none() {
            missing.insert("roofType".into(), "Roof type is required".into());
        }
        let (Some(inspection_date), Some(roof_type)) = (self.inspection_date, self.roof_type) else {
            return Err(RoofdeskError::Validation(missing));
        };

        let mut report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            created_by: user_id.to_string(),
            customer_id: self.customer_id,
            customer_name: self.customer_name.trim().to_string(),
            customer_address: self.customer_address,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            customer_type: self.customer_type,
            building_id: self.building_id,
            building_address: self.building_address,
            inspection_date,
            roof_type,
            roof_age: self.roof_age,
            roof_size_m2: self.roof_size_m2,
            roof_outline: self.roof_outline,
            roof_snapshot: None,
            condition_notes: self.condition_notes,
            issues_found: self.issues_found,
            recommended_actions: self.recommended_actions,
            costs: self.costs,
            total_cost: 0.0,
            status,
            is_shared: false,
            created_at: now,
            last_edited: now,
        };
        report.recompute_total();
        Ok(report)
    }
}

impl Report {
    /// Replace the editable content with `form`, keeping identity, status and attachments.
    pub fn apply_form(&mut self, form: ReportFormData, now: DateTime<Utc>) -> Result<(), RoofdeskError> {
        let mut updated = form.into_report(&self.branch_id, &self.created_by, self.status, now)?;
        updated.id = std::mem::take(&mut self.id);
        updated.created_at = self.created_at;
        updated.is_shared = self.is_shared;
        updated.roof_snapshot = self.roof_snapshot.take();
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_field_names() {
        let form: ReportFormData = serde_json::from_str(
            r#"{"customerName": "Jens Hansen", "roofAge": 12, "laborCost": 800}"#,
        )
        .unwrap();
        assert_eq!(form.customer_name, "Jens Hansen");
        assert_eq!(form.roof_age, Some(12));
        assert_eq!(form.costs.labor_cost, 800.0);
    }

    #[test]
    fn test_into_report_requires_date_and_roof_type() {
        let form = ReportFormData { customer_name: "A".into(), ..Default::default() };
        let err = form.into_report("b-1", "u-1", ReportStatus::Draft, Utc::now()).unwrap_err();
        match err {
            RoofdeskError::Validation(fields) => {
                assert!(fields.contains_key("inspectionDate"));
                assert!(fields.contains_key("roofType"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_into_report_computes_total() {
        let form = ReportFormData {
            customer_name: "  Karen Holm ".into(),
            inspection_date: NaiveDate::from_ymd_opt(2026, 5, 4),
            roof_type: Some(RoofType::Tile),
            costs: CostBreakdown { labor_cost: 100.0, material_cost: 50.0, ..Default::default() },
            ..Default::default()
        };
        let report = form.into_report("b-1", "u-1", ReportStatus::Completed, Utc::now()).unwrap();
        assert_eq!(report.customer_name, "Karen Holm");
        assert_eq!(report.total_cost, 150.0);
        assert_eq!(report.status, ReportStatus::Completed);
    }

    #[test]
    fn test_apply_form_keeps_identity() {
        let form = ReportFormData {
            customer_name: "Karen Holm".into(),
            inspection_date: NaiveDate::from_ymd_opt(2026, 5, 4),
            roof_type: Some(RoofType::Tile),
            ..Default::default()
        };
        let mut report = form.clone().into_report("b-1", "u-1", ReportStatus::Completed, Utc::now()).unwrap();
        report.roof_snapshot = Some("branches/b-1/reports/r/snapshots/s.png".into());
        let id = report.id.clone();

        let edit = ReportFormData { customer_name: "Karen Holm Nielsen".into(), ..form };
        report.apply_form(edit, Utc::now()).unwrap();
        assert_eq!(report.id, id);
        assert_eq!(report.customer_name, "Karen Holm Nielsen");
        assert_eq!(report.status, ReportStatus::Completed);
        assert!(report.roof_snapshot.is_some());
    }
}
