use crate::models::{Branch, Report};
use crate::utils::formatting::{format_area, format_date, format_money};
use super::formatter::{actions_by_priority, cost_rows, issues_by_severity, severity_summary};

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;color:#1d2329;margin:2cm;font-size:11pt}\
h1{font-size:20pt;margin-bottom:0}h2{font-size:14pt;border-bottom:1px solid #ccd3da;padding-bottom:4px;margin-top:24px}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccd3da;padding:6px 8px;text-align:left}\
th{background:#f1f4f7}.num{text-align:right}.sev-critical{color:#b3261e;font-weight:bold}.sev-high{color:#d3541b}\
.letterhead{color:#5b6670;margin-bottom:16px}.issue{page-break-inside:avoid;margin-bottom:12px}\
@media print{body{margin:0}}";

/// Escape text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>\n", label, escape_html(value)));
}

/// Self-contained print-ready document. All user text is escaped.
pub fn render_html(report: &Report, branch: Option<&Branch>, currency: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"da\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Roof Inspection Report: {}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape_html(&report.customer_name),
        STYLE
    ));

    if let Some(branch) = branch {
        out.push_str(&format!("<div class=\"letterhead\"><strong>{}</strong>", escape_html(&branch.name)));
        for extra in [&branch.address, &branch.email].into_iter().flatten() {
            out.push_str(&format!(" &middot; {}", escape_html(extra)));
        }
        out.push_str("</div>\n");
    }
    out.push_str(&format!("<h1>Roof Inspection Report</h1>\n<p>{}</p>\n", escape_html(&report.customer_name)));

    out.push_str("<h2>Customer</h2>\n<table>\n");
    row(&mut out, "Name", &report.customer_name);
    row(&mut out, "Address", &report.customer_address);
    if let Some(phone) = &report.customer_phone {
        row(&mut out, "Phone", phone);
    }
    if let Some(email) = &report.customer_email {
        row(&mut out, "Email", email);
    }
    if let Some(address) = &report.building_address {
        row(&mut out, "Building", address);
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Inspection</h2>\n<table>\n");
    row(&mut out, "Date", &format_date(report.inspection_date));
    row(&mut out, "Roof type", report.roof_type.label());
    if let Some(age) = report.roof_age {
        row(&mut out, "Roof age", &format!("{} years", age));
    }
    if let Some(size) = report.roof_size_m2 {
        row(&mut out, "Roof size", &format_area(size));
    }
    out.push_str("</table>\n");
    if !report.condition_notes.trim().is_empty() {
        out.push_str(&format!("<p>{}</p>\n", escape_html(report.condition_notes.trim()).replace('\n', "<br>")));
    }

    let summary = severity_summary(&report.issues_found);
    out.push_str("<h2>Issues</h2>\n");
    out.push_str(&format!(
        "<p>{} issues: {} critical, {} high, {} medium, {} low</p>\n",
        summary.total(),
        summary.critical,
        summary.high,
        summary.medium,
        summary.low
    ));
    for issue in issues_by_severity(report) {
        out.push_str(&format!(
            "<div class=\"issue\"><h3>{} <span class=\"sev-{}\">({})</span></h3>\n",
            issue.issue_type.label(),
            issue.severity.label().to_lowercase(),
            issue.severity.label()
        ));
        if let Some(location) = &issue.location {
            out.push_str(&format!("<p><em>{}</em></p>\n", escape_html(location)));
        }
        out.push_str(&format!("<p>{}</p>\n</div>\n", escape_html(issue.description.trim())));
    }

    if !report.recommended_actions.is_empty() {
        out.push_str("<h2>Recommended Actions</h2>\n<table>\n");
        out.push_str("<tr><th>Priority</th><th>Urgency</th><th>Action</th><th class=\"num\">Estimate</th></tr>\n");
        for action in actions_by_priority(report) {
            let estimate = action
                .estimated_cost
                .map(|c| format_money(c, currency))
                .unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>\n",
                action.priority.label(),
                action.urgency.label(),
                escape_html(&action.description),
                estimate
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str("<h2>Costs</h2>\n<table>\n");
    for (label, amount) in cost_rows(report) {
        out.push_str(&format!(
            "<tr><th>{}</th><td class=\"num\">{}</td></tr>\n",
            label,
            format_money(amount, currency)
        ));
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, IssueType, ReportFormData, ReportStatus, RoofType, Severity};
    use chrono::{NaiveDate, Utc};

    fn report(name: &str, description: &str) -> Report {
        ReportFormData {
            customer_name: name.into(),
            inspection_date: NaiveDate::from_ymd_opt(2026, 9, 14),
            roof_type: Some(RoofType::Metal),
            issues_found: vec![Issue::new(IssueType::Damage, Severity::High, description)],
            ..Default::default()
        }
        .into_report("b1", "u1", ReportStatus::Completed, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render_html(&report("<script>alert(1)</script>", "Hul i <b>pladen</b> & rust"), None, "DKK");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Hul i &lt;b&gt;pladen&lt;/b&gt; &amp; rust"));
    }

    #[test]
    fn test_document_is_self_contained() {
        let html = render_html(&report("Per Vang", "Bulet plade"), None, "DKK");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<link"));
        assert!(html.contains("1 issues: 0 critical, 1 high, 0 medium, 0 low"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
