use std::sync::LazyLock;

use chrono::{Days, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, RoofdeskError};
use crate::models::ReportFormData;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Steps of the report wizard, numbered as the form shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    CustomerInfo = 1,
    InspectionDetails = 2,
    Issues = 3,
    Review = 4,
}

impl WizardStep {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 4;

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::CustomerInfo),
            2 => Some(Self::InspectionDetails),
            3 => Some(Self::Issues),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }
}

/// Outcome of validating one step. Only `errors` block progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    pub errors: FieldErrors,
    pub warnings: FieldErrors,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<StepReport, RoofdeskError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(RoofdeskError::Validation(self.errors))
        }
    }

    fn merge(&mut self, other: StepReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

pub fn validate_step(step: WizardStep, form: &ReportFormData) -> StepReport {
    validate_step_on(step, form, Utc::now().date_naive())
}

/// Validate `step` with `today` as the reference date for date checks.
pub fn validate_step_on(step: WizardStep, form: &ReportFormData, today: NaiveDate) -> StepReport {
    match step {
        WizardStep::CustomerInfo => customer_info(form),
        WizardStep::InspectionDetails => inspection_details(form, today),
        WizardStep::Issues => issues(form),
        WizardStep::Review => {
            let mut report = customer_info(form);
            report.merge(inspection_details(form, today));
            report.merge(issues(form));
            report.merge(review(form));
            report
        }
    }
}

fn customer_info(form: &ReportFormData) -> StepReport {
    let mut report = StepReport::default();

    if form.customer_name.trim().is_empty() {
        report.errors.insert("customerName".into(), "Customer name is required".into());
    }

    // Contact details are optional at this point; a bad value is flagged
    // but does not block the wizard.
    if let Some(email) = form.customer_email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !EMAIL_RE.is_match(email.trim()) {
            report.warnings.insert("customerEmail".into(), "Email address looks invalid".into());
        }
    }
    if let Some(phone) = form.customer_phone.as_deref().filter(|p| !p.trim().is_empty()) {
        if !plausible_phone(phone) {
            report.warnings.insert("customerPhone".into(), "Phone number looks invalid".into());
        }
    }
    if form.customer_address.trim().is_empty() {
        report.warnings.insert("customerAddress".into(), "No address entered".into());
    }

    report
}

fn plausible_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    allowed && (8..=15).contains(&digits)
}

fn inspection_details(form: &ReportFormData, today: NaiveDate) -> StepReport {
    let mut report = StepReport::default();

    match form.inspection_date {
        None => {
            report.errors.insert("inspectionDate".into(), "Inspection date is required".into());
        }
        Some(date) => {
            let limit = today.checked_add_days(Days::new(1)).unwrap_or(today);
            if date > limit {
                report.errors.insert(
                    "inspectionDate".into(),
                    "Inspection date cannot be in the future".into(),
                );
            }
        }
    }

    if form.roof_type.is_none() {
        report.errors.insert("roofType".into(), "Roof type is required".into());
    }

    if let Some(age) = form.roof_age {
        if !(0..=100).contains(&age) {
            report.errors.insert("roofAge".into(), "Roof age must be between 0 and 100".into());
        }
    }

    if let Some(size) = form.roof_size_m2 {
        if !size.is_finite() || size < 0.0 {
            report.errors.insert("roofSizeM2".into(), "Roof size must be a positive number".into());
        }
    }

    if form.roof_outline.iter().any(|p| !p.is_valid()) {
        report.errors.insert("roofOutline".into(), "Roof outline contains invalid coordinates".into());
    }

    report
}

fn issues(form: &ReportFormData) -> StepReport {
    let mut report = StepReport::default();

    for (i, issue) in form.issues_found.iter().enumerate() {
        if issue.description.trim().is_empty() {
            report.errors.insert(
                format!("issuesFound[{i}].description"),
                "Describe the issue".into(),
            );
        }
        if let Some(pin) = issue.image_pin {
            if !pin.in_bounds() {
                report.errors.insert(
                    format!("issuesFound[{i}].imagePin"),
                    "Pin must be placed inside the image".into(),
                );
            }
        }
        if let Some(pin) = issue.map_pin {
            if !pin.is_valid() {
                report.errors.insert(format!("issuesFound[{i}].mapPin"), "Invalid map position".into());
            }
        }
    }

    if form.issues_found.is_empty() {
        report.warnings.insert("issuesFound".into(), "No issues recorded".into());
    }

    report
}

fn review(form: &ReportFormData) -> StepReport {
    let mut report = StepReport::default();

    for (i, action) in form.recommended_actions.iter().enumerate() {
        if action.description.trim().is_empty() {
            report.errors.insert(
                format!("recommendedActions[{i}].description"),
                "Describe the action".into(),
            );
        }
        if let Some(cost) = action.estimated_cost {
            if !cost.is_finite() || cost < 0.0 {
                report.errors.insert(
                    format!("recommendedActions[{i}].estimatedCost"),
                    "Estimated cost cannot be negative".into(),
                );
            }
        }
    }

    let costs = [
        ("laborCost", form.costs.labor_cost),
        ("materialCost", form.costs.material_cost),
        ("travelCost", form.costs.travel_cost),
        ("overheadCost", form.costs.overhead_cost),
    ];
    for (field, value) in costs {
        if !value.is_finite() || value < 0.0 {
            report.errors.insert(field.into(), "Cost cannot be negative".into());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImagePin, Issue, IssueType, LatLng, RoofType, Severity};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn complete_form() -> ReportFormData {
        ReportFormData {
            customer_name: "Mette Nielsen".into(),
            customer_address: "Vestergade 12, 8000 Aarhus".into(),
            customer_email: Some("mette@example.dk".into()),
            inspection_date: NaiveDate::from_ymd_opt(2026, 5, 30),
            roof_type: Some(RoofType::Tile),
            roof_age: Some(25),
            issues_found: vec![Issue::new(IssueType::Leak, Severity::High, "Leak at chimney")],
            ..Default::default()
        }
    }

    #[test]
    fn test_step1_fails_only_on_empty_name() {
        let mut form = ReportFormData::default();
        let report = validate_step_on(WizardStep::CustomerInfo, &form, today());
        assert!(!report.is_valid());
        assert!(report.errors.contains_key("customerName"));

        form.customer_name = "   ".into();
        assert!(!validate_step_on(WizardStep::CustomerInfo, &form, today()).is_valid());

        form.customer_name = "Ole".into();
        assert!(validate_step_on(WizardStep::CustomerInfo, &form, today()).is_valid());
    }

    #[test]
    fn test_step1_independent_of_other_steps() {
        let form = ReportFormData {
            customer_name: "Ole".into(),
            roof_age: Some(500),
            customer_email: Some("not-an-email".into()),
            costs: crate::models::CostBreakdown { labor_cost: -5.0, ..Default::default() },
            ..Default::default()
        };
        let report = validate_step_on(WizardStep::CustomerInfo, &form, today());
        assert!(report.is_valid());
        assert!(report.warnings.contains_key("customerEmail"));
    }

    #[test]
    fn test_step2_requires_date_and_roof_type() {
        let form = ReportFormData::default();
        let report = validate_step_on(WizardStep::InspectionDetails, &form, today());
        assert!(report.errors.contains_key("inspectionDate"));
        assert!(report.errors.contains_key("roofType"));
    }

    #[test]
    fn test_step2_roof_age_range() {
        let mut form = complete_form();
        form.roof_age = Some(101);
        let report = validate_step_on(WizardStep::InspectionDetails, &form, today());
        assert!(report.errors.contains_key("roofAge"));

        form.roof_age = Some(100);
        assert!(validate_step_on(WizardStep::InspectionDetails, &form, today()).is_valid());
    }

    #[test]
    fn test_step2_future_date_rejected() {
        let mut form = complete_form();
        form.inspection_date = NaiveDate::from_ymd_opt(2026, 6, 2);
        assert!(validate_step_on(WizardStep::InspectionDetails, &form, today()).is_valid());
        form.inspection_date = NaiveDate::from_ymd_opt(2026, 6, 10);
        assert!(!validate_step_on(WizardStep::InspectionDetails, &form, today()).is_valid());
    }

    #[test]
    fn test_step2_invalid_outline() {
        let mut form = complete_form();
        form.roof_outline = vec![LatLng::new(120.0, 10.0)];
        let report = validate_step_on(WizardStep::InspectionDetails, &form, today());
        assert!(report.errors.contains_key("roofOutline"));
    }

    #[test]
    fn test_step3_issue_fields() {
        let mut form = complete_form();
        let mut issue = Issue::new(IssueType::Damage, Severity::Low, "");
        issue.image_pin = Some(ImagePin { x: 150.0, y: 10.0 });
        form.issues_found.push(issue);
        let report = validate_step_on(WizardStep::Issues, &form, today());
        assert!(report.errors.contains_key("issuesFound[1].description"));
        assert!(report.errors.contains_key("issuesFound[1].imagePin"));
        assert!(!report.errors.contains_key("issuesFound[0].description"));
    }

    #[test]
    fn test_step3_no_issues_is_warning() {
        let mut form = complete_form();
        form.issues_found.clear();
        let report = validate_step_on(WizardStep::Issues, &form, today());
        assert!(report.is_valid());
        assert!(report.warnings.contains_key("issuesFound"));
    }

    #[test]
    fn test_review_aggregates_steps() {
        let mut form = complete_form();
        assert!(validate_step_on(WizardStep::Review, &form, today()).is_valid());

        form.customer_name.clear();
        form.costs.travel_cost = -1.0;
        let report = validate_step_on(WizardStep::Review, &form, today());
        assert!(report.errors.contains_key("customerName"));
        assert!(report.errors.contains_key("travelCost"));
    }

    #[test]
    fn test_into_result() {
        let form = ReportFormData::default();
        let err = validate_step_on(WizardStep::CustomerInfo, &form, today()).into_result();
        assert!(matches!(err, Err(RoofdeskError::Validation(_))));
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WizardStep::from_number(3), Some(WizardStep::Issues));
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::Review.number(), 4);
    }

    #[test]
    fn test_plausible_phone() {
        assert!(plausible_phone("+45 12 34 56 78"));
        assert!(!plausible_phone("call me"));
        assert!(!plausible_phone("123"));
    }
}
