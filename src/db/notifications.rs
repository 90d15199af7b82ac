use chrono::{DateTime, Utc};

use crate::errors::RoofdeskError;
use crate::models::{EmailTemplate, NotificationPreferences, QueuedEmail};
use super::Database;

impl Database {
    /// Stored preferences, or the defaults if the user never changed them.
    pub fn get_preferences(&self, user_id: &str) -> Result<NotificationPreferences, RoofdeskError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT email_enabled, report_completed, offer_updates, weekly_summary
             FROM notification_preferences WHERE user_id = ?1",
            rusqlite::params![user_id],
            |row| {
                Ok(NotificationPreferences {
                    user_id: user_id.to_string(),
                    email_enabled: row.get(0)?,
                    report_completed: row.get(1)?,
                    offer_updates: row.get(2)?,
                    weekly_summary: row.get(3)?,
                })
            },
        );

        match result {
            Ok(prefs) => Ok(prefs),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(NotificationPreferences::defaults_for(user_id)),
            Err(e) => Err(RoofdeskError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn save_preferences(&self, prefs: &NotificationPreferences) -> Result<(), RoofdeskError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO notification_preferences
             (user_id, email_enabled, report_completed, offer_updates, weekly_summary, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                prefs.user_id,
                prefs.email_enabled,
                prefs.report_completed,
                prefs.offer_updates,
                prefs.weekly_summary,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to save preferences: {}", e)))?;
        Ok(())
    }

    /// Add a pending message to the mail queue and return its id.
    pub fn enqueue_mail(
        &self,
        branch_id: &str,
        recipient: &str,
        template: EmailTemplate,
        payload: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<String, RoofdeskError> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO mail_queue (id, branch_id, recipient, template, payload, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
            rusqlite::params![
                id,
                branch_id,
                recipient,
                template.as_str(),
                serde_json::to_string(payload)?,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to enqueue mail: {}", e)))?;
        Ok(id)
    }

    /// Queued mail for a branch, oldest first.
    pub fn list_mail(&self, branch_id: &str) -> Result<Vec<QueuedEmail>, RoofdeskError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, branch_id, recipient, template, payload, status, created_at
                 FROM mail_queue WHERE branch_id = ?1 ORDER BY created_at, rowid",
            )
            .map_err(|e| RoofdeskError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![branch_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(|e| RoofdeskError::Database(format!("Query error: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (id, branch_id, to, template, payload, status, created_at) =
                row.map_err(|e| RoofdeskError::Database(format!("Row error: {}", e)))?;
            results.push(QueuedEmail {
                id,
                branch_id,
                to,
                template,
                data: serde_json::from_str(&payload)?,
                status,
                created_at,
            });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferences_default_then_saved() {
        let db = Database::in_memory().unwrap();
        let mut prefs = db.get_preferences("u1").unwrap();
        assert_eq!(prefs, NotificationPreferences::defaults_for("u1"));

        prefs.weekly_summary = true;
        prefs.offer_updates = false;
        db.save_preferences(&prefs).unwrap();
        assert_eq!(db.get_preferences("u1").unwrap(), prefs);
    }

    #[test]
    fn test_mail_queue_scoped_by_branch() {
        let db = Database::in_memory().unwrap();
        db.enqueue_mail("b1", "kunde@example.dk", EmailTemplate::ReportSent, &json!({"reportId": "r1"}), Utc::now())
            .unwrap();

        let queued = db.list_mail("b1").unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].template, "report_sent");
        assert_eq!(queued[0].status, "pending");
        assert_eq!(queued[0].data["reportId"], "r1");
        assert!(db.list_mail("b2").unwrap().is_empty());
    }
}
