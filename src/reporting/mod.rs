pub mod formatter;
pub mod html;

pub use formatter::{render_markdown, severity_summary, ExportFormat, SeveritySummary};
pub use html::render_html;

use crate::models::{Branch, Report};

/// Render a report in the requested format. Amounts are shown in `currency`.
pub fn export_report(report: &Report, branch: Option<&Branch>, format: ExportFormat, currency: &str) -> String {
    match format {
        ExportFormat::Markdown => render_markdown(report, branch, currency),
        ExportFormat::Html => render_html(report, branch, currency),
    }
}
