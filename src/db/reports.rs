use chrono::{DateTime, Utc};

use crate::errors::RoofdeskError;
use crate::models::{Report, ReportStatus};
use super::connection::enum_tag;
use super::Database;

/// Listing options for reports. Archived reports are hidden unless asked for.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub include_archived: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self { status: None, include_archived: false, limit: 50, offset: 0 }
    }
}

impl Database {
    pub fn insert_report(&self, report: &Report) -> Result<(), RoofdeskError> {
        let document = serde_json::to_string(report)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reports (id, branch_id, created_by, customer_name, status, inspection_date, document, created_at, last_edited)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                report.id,
                report.branch_id,
                report.created_by,
                report.customer_name,
                enum_tag(&report.status)?,
                report.inspection_date.to_string(),
                document,
                report.created_at.to_rfc3339(),
                report.last_edited.to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to create report: {}", e)))?;
        Ok(())
    }

    pub fn get_report(&self, branch_id: &str, id: &str) -> Result<Option<Report>, RoofdeskError> {
        let document = {
            let conn = self.lock()?;
            let result = conn.query_row(
                "SELECT document FROM reports WHERE id = ?1 AND branch_id = ?2",
                rusqlite::params![id, branch_id],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(doc) => doc,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(RoofdeskError::Database(format!("Query error: {}", e))),
            }
        };
        Ok(Some(serde_json::from_str(&document)?))
    }

    /// Most recently edited first.
    /// Number of reports matching `filter`, ignoring its paging.
    pub fn count_reports(&self, branch_id: &str, filter: &ReportFilter) -> Result<usize, RoofdeskError> {
        let status = filter.status.as_ref().map(enum_tag).transpose()?;
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM reports
                 WHERE branch_id = ?1
                   AND (?2 IS NULL OR status = ?2)
                   AND (?3 OR ?2 = 'archived' OR status != 'archived')",
                rusqlite::params![branch_id, status, filter.include_archived],
                |row| row.get(0),
            )
            .map_err(|e| RoofdeskError::Database(format!("Count failed: {}", e)))?;
        Ok(count as usize)
    }

    pub fn list_reports(&self, branch_id: &str, filter: &ReportFilter) -> Result<Vec<Report>, RoofdeskError> {
        let status = filter.status.as_ref().map(enum_tag).transpose()?;
        let documents = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare(
                    "SELECT document FROM reports
                     WHERE branch_id = ?1
                       AND (?2 IS NULL OR status = ?2)
                       AND (?3 OR ?2 = 'archived' OR status != 'archived')
                     ORDER BY last_edited DESC
                     LIMIT ?4 OFFSET ?5",
                )
                .map_err(|e| RoofdeskError::Database(format!("Query failed: {}", e)))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![
                        branch_id,
                        status,
                        filter.include_archived,
                        filter.limit as i64,
                        filter.offset as i64,
                    ],
                    |row| row.get::<_, String>(0),
                )
                .map_err(|e| RoofdeskError::Database(format!("Query error: {}", e)))?;

            let mut documents = Vec::new();
            for row in rows {
                documents.push(row.map_err(|e| RoofdeskError::Database(format!("Row error: {}", e)))?);
            }
            documents
        };

        documents
            .iter()
            .map(|doc| serde_json::from_str(doc).map_err(RoofdeskError::from))
            .collect()
    }

    /// Write the whole document back. Last write wins. Returns false if the report is gone.
    pub fn save_report(&self, report: &Report) -> Result<bool, RoofdeskError> {
        let document = serde_json::to_string(report)?;
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "UPDATE reports SET customer_name = ?3, status = ?4, inspection_date = ?5, document = ?6, last_edited = ?7
                 WHERE id = ?1 AND branch_id = ?2",
                rusqlite::params![
                    report.id,
                    report.branch_id,
                    report.customer_name,
                    enum_tag(&report.status)?,
                    report.inspection_date.to_string(),
                    document,
                    report.last_edited.to_rfc3339(),
                ],
            )
            .map_err(|e| RoofdeskError::Database(format!("Update failed: {}", e)))?;
        Ok(affected > 0)
    }

    /// Direct status write, no transition rules.
    pub fn set_report_status(
        &self,
        branch_id: &str,
        id: &str,
        status: ReportStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Report>, RoofdeskError> {
        let Some(mut report) = self.get_report(branch_id, id)? else {
            return Ok(None);
        };
        report.status = status;
        if status == ReportStatus::Shared {
            report.is_shared = true;
        }
        report.last_edited = now;
        self.save_report(&report)?;
        Ok(Some(report))
    }

    pub fn archive_report(&self, branch_id: &str, id: &str, now: DateTime<Utc>) -> Result<Option<Report>, RoofdeskError> {
        self.set_report_status(branch_id, id, ReportStatus::Archived, now)
    }
}
