use std::str::FromStr;

use serde::Serialize;

use crate::errors::RoofdeskError;
use crate::models::{Branch, Issue, RecommendedAction, Report, Severity};
use crate::utils::formatting::{format_area, format_date, format_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RoofdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "pdf" => Ok(Self::Html),
            other => Err(RoofdeskError::BadRequest(format!("Unsupported export format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeveritySummary {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

pub fn severity_summary(issues: &[Issue]) -> SeveritySummary {
    issues.iter().fold(SeveritySummary::default(), |mut acc, issue| {
        match issue.severity {
            Severity::Critical => acc.critical += 1,
            Severity::High => acc.high += 1,
            Severity::Medium => acc.medium += 1,
            Severity::Low => acc.low += 1,
        }
        acc
    })
}

/// Issues with the most severe first. Stable for equal severity.
pub(crate) fn issues_by_severity(report: &Report) -> Vec<&Issue> {
    let mut issues: Vec<&Issue> = report.issues_found.iter().collect();
    issues.sort_by_key(|i| i.severity.rank());
    issues
}

pub(crate) fn actions_by_priority(report: &Report) -> Vec<&RecommendedAction> {
    let mut actions: Vec<&RecommendedAction> = report.recommended_actions.iter().collect();
    actions.sort_by_key(|a| a.priority.rank());
    actions
}

/// Label/amount rows of the cost table, total last.
pub(crate) fn cost_rows(report: &Report) -> Vec<(&'static str, f64)> {
    let costs = &report.costs;
    vec![
        ("Labor", costs.labor_cost),
        ("Materials", costs.material_cost),
        ("Travel", costs.travel_cost),
        ("Overhead", costs.overhead_cost),
        ("Total", report.total_cost),
    ]
}

/// Inline text for a table cell: no pipes or line breaks.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

pub fn render_markdown(report: &Report, branch: Option<&Branch>, currency: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Roof Inspection Report: {}\n\n", report.customer_name));
    if let Some(branch) = branch {
        out.push_str(&format!("*{}*", branch.name));
        if let Some(address) = &branch.address {
            out.push_str(&format!(" · {}", address));
        }
        out.push_str("\n\n");
    }

    out.push_str("## Customer\n\n");
    out.push_str(&format!("- **Name:** {}\n", report.customer_name));
    if !report.customer_address.trim().is_empty() {
        out.push_str(&format!("- **Address:** {}\n", report.customer_address));
    }
    if let Some(phone) = report.customer_phone.as_deref().filter(|p| !p.is_empty()) {
        out.push_str(&format!("- **Phone:** {}\n", phone));
    }
    if let Some(email) = report.customer_email.as_deref().filter(|e| !e.is_empty()) {
        out.push_str(&format!("- **Email:** {}\n", email));
    }
    if let Some(address) = report.building_address.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(&format!("- **Building:** {}\n", address));
    }

    out.push_str("\n## Inspection\n\n");
    out.push_str(&format!("- **Date:** {}\n", format_date(report.inspection_date)));
    out.push_str(&format!("- **Roof type:** {}\n", report.roof_type.label()));
    if let Some(age) = report.roof_age {
        out.push_str(&format!("- **Roof age:** {} years\n", age));
    }
    if let Some(size) = report.roof_size_m2 {
        out.push_str(&format!("- **Roof size:** {}\n", format_area(size)));
    }
    out.push_str(&format!("- **Status:** {}\n", report.status));
    if !report.condition_notes.trim().is_empty() {
        out.push_str(&format!("\n{}\n", report.condition_notes.trim()));
    }

    let summary = severity_summary(&report.issues_found);
    out.push_str("\n## Issues\n\n");
    out.push_str("| Severity | Count |\n|---|---|\n");
    out.push_str(&format!("| Critical | {} |\n", summary.critical));
    out.push_str(&format!("| High | {} |\n", summary.high));
    out.push_str(&format!("| Medium | {} |\n", summary.medium));
    out.push_str(&format!("| Low | {} |\n", summary.low));
    out.push_str(&format!("| **Total** | **{}** |\n\n", summary.total()));

    for issue in issues_by_severity(report) {
        out.push_str(&format!("### {} ({})\n\n", issue.issue_type.label(), issue.severity.label()));
        if let Some(location) = issue.location.as_deref().filter(|l| !l.is_empty()) {
            out.push_str(&format!("**Location:** {}\n\n", location));
        }
        out.push_str(&format!("{}\n\n", issue.description.trim()));
        if !issue.images.is_empty() {
            out.push_str(&format!("Photos: {}\n\n", issue.images.len()));
        }
    }

    if !report.recommended_actions.is_empty() {
        out.push_str("## Recommended Actions\n\n");
        out.push_str("| Priority | Urgency | Action | Estimate |\n|---|---|---|---|\n");
        for action in actions_by_priority(report) {
            let estimate = action
                .estimated_cost
                .map(|c| format_money(c, currency))
                .unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                action.priority.label(),
                action.urgency.label(),
                cell(&action.description),
                estimate
            ));
        }
        out.push('\n');
    }

    out.push_str("## Costs\n\n| Item | Amount |\n|---|---|\n");
    for (label, amount) in cost_rows(report) {
        out.push_str(&format!("| {} | {} |\n", label, format_money(amount, currency)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostBreakdown, IssueType, Priority, ReportFormData, ReportStatus, RoofType, Urgency};
    use chrono::{NaiveDate, Utc};

    fn sample_report() -> Report {
        ReportFormData {
            customer_name: "Anders Holm".into(),
            customer_address: "Bredgade 10, 5000 Odense C".into(),
            inspection_date: NaiveDate::from_ymd_opt(2026, 9, 14),
            roof_type: Some(RoofType::Tile),
            roof_age: Some(35),
            condition_notes: "Generelt slidt tag.".into(),
            issues_found: vec![
                Issue::new(IssueType::Gutters, Severity::Low, "Tagrende hænger"),
                Issue::new(IssueType::Leak, Severity::Critical, "Utæthed ved skorsten"),
                Issue::new(IssueType::Wear, Severity::Medium, "Mos på nordsiden"),
            ],
            recommended_actions: vec![
                RecommendedAction {
                    id: "a1".into(),
                    priority: Priority::Low,
                    urgency: Urgency::LongTerm,
                    description: "Rens | tag".into(),
                    estimated_cost: None,
                },
                RecommendedAction {
                    id: "a2".into(),
                    priority: Priority::High,
                    urgency: Urgency::Immediate,
                    description: "Tæt skorsten".into(),
                    estimated_cost: Some(4500.0),
                },
            ],
            costs: CostBreakdown { labor_cost: 3000.0, material_cost: 1500.0, ..Default::default() },
            ..Default::default()
        }
        .into_report("b1", "u1", ReportStatus::Completed, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_severity_summary() {
        let summary = severity_summary(&sample_report().issues_found);
        assert_eq!(summary, SeveritySummary { critical: 1, high: 0, medium: 1, low: 1 });
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_markdown_orders_issues_and_actions() {
        let md = render_markdown(&sample_report(), None, "DKK");
        let leak = md.find("### Leak (Critical)").unwrap();
        let wear = md.find("### Wear (Medium)").unwrap();
        let gutters = md.find("### Gutters (Low)").unwrap();
        assert!(leak < wear && wear < gutters);

        let high = md.find("| High | Immediate | Tæt skorsten | 4,500.00 DKK |").unwrap();
        let low = md.find("| Low | Long term | Rens \\| tag | - |").unwrap();
        assert!(high < low);
    }

    #[test]
    fn test_markdown_cost_table_and_details() {
        let md = render_markdown(&sample_report(), None, "DKK");
        assert!(md.contains("| Total | 4,500.00 DKK |"));
        assert!(md.contains("- **Date:** 14.09.2026"));
        assert!(md.contains("- **Roof age:** 35 years"));
        assert!(md.contains("- **Status:** completed"));
    }

    #[test]
    fn test_markdown_branch_letterhead() {
        let branch = Branch {
            id: "b1".into(),
            name: "Fyns Tagservice".into(),
            address: Some("Havnen 2".into()),
            email: None,
            created_at: Utc::now(),
        };
        let md = render_markdown(&sample_report(), Some(&branch), "DKK");
        assert!(md.contains("*Fyns Tagservice* · Havnen 2"));
    }

    #[test]
    fn test_markdown_uses_given_currency() {
        let md = render_markdown(&sample_report(), None, "EUR");
        assert!(md.contains("| Total | 4,500.00 EUR |"));
        assert!(!md.contains("DKK"));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
