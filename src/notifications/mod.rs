use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::NotificationsConfig;
use crate::db::Database;
use crate::models::{EmailTemplate, Offer, OfferStatus, Report, ReportStatus};

/// Recipient marker for inspectors; the queue consumer maps user ids to addresses.
pub fn user_recipient(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Enqueues transactional mail. Never fails the caller's operation.
#[derive(Clone)]
pub struct Notifier {
    db: Database,
    config: NotificationsConfig,
}

impl Notifier {
    pub fn new(db: Database, config: NotificationsConfig) -> Self {
        Self { db, config }
    }

    /// Queue one message. Returns the queue id, or `None` if nothing was queued.
    pub fn enqueue_email(&self, branch_id: &str, to: &str, template: EmailTemplate, data: Value) -> Option<String> {
        if !self.config.enabled {
            debug!(template = template.as_str(), "Notifications disabled, not queueing");
            return None;
        }
        let to = to.trim();
        if to.is_empty() {
            debug!(template = template.as_str(), "No recipient, not queueing");
            return None;
        }

        let mut payload = data;
        if let Value::Object(map) = &mut payload {
            map.insert("from".into(), Value::String(self.config.from_address.clone()));
        }

        match self.db.enqueue_mail(branch_id, to, template, &payload, Utc::now()) {
            Ok(id) => {
                info!(mail_id = %id, template = template.as_str(), "Queued email");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, template = template.as_str(), "Failed to queue email");
                None
            }
        }
    }

    /// Mail triggered by a report status write.
    pub fn report_status_changed(&self, report: &Report) -> Option<String> {
        match report.status {
            ReportStatus::Sent => {
                let to = report.customer_email.as_deref()?;
                self.enqueue_email(
                    &report.branch_id,
                    to,
                    EmailTemplate::ReportSent,
                    json!({
                        "reportId": report.id,
                        "customerName": report.customer_name,
                        "inspectionDate": report.inspection_date,
                    }),
                )
            }
            ReportStatus::Completed => {
                if !self.author_wants(&report.created_by, EmailTemplate::ReportCompleted) {
                    return None;
                }
                self.enqueue_email(
                    &report.branch_id,
                    &user_recipient(&report.created_by),
                    EmailTemplate::ReportCompleted,
                    json!({ "reportId": report.id, "customerName": report.customer_name }),
                )
            }
            _ => None,
        }
    }

    pub fn offer_created(&self, offer: &Offer) -> Option<String> {
        let to = offer.customer_email.as_deref()?;
        self.enqueue_email(
            &offer.branch_id,
            to,
            EmailTemplate::OfferCreated,
            json!({
                "offerId": offer.id,
                "reportId": offer.report_id,
                "customerName": offer.customer_name,
                "title": offer.title,
                "totalAmount": offer.total_amount,
                "currency": offer.currency,
                "validUntil": offer.valid_until,
            }),
        )
    }

    /// Tell the report author that the customer answered.
    pub fn offer_responded(&self, offer: &Offer, author_id: &str) -> Option<String> {
        if !matches!(offer.status, OfferStatus::Accepted | OfferStatus::Rejected) {
            return None;
        }
        if !self.author_wants(author_id, EmailTemplate::OfferResponse) {
            return None;
        }
        self.enqueue_email(
            &offer.branch_id,
            &user_recipient(author_id),
            EmailTemplate::OfferResponse,
            json!({
                "offerId": offer.id,
                "reportId": offer.report_id,
                "customerName": offer.customer_name,
                "status": offer.status.as_str(),
            }),
        )
    }

    fn author_wants(&self, user_id: &str, template: EmailTemplate) -> bool {
        match self.db.get_preferences(user_id) {
            Ok(prefs) => prefs.wants(template),
            Err(e) => {
                warn!(error = %e, user_id, "Could not read notification preferences");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationPreferences, ReportFormData, RoofType};
    use chrono::NaiveDate;

    fn report(email: Option<&str>, status: ReportStatus) -> Report {
        ReportFormData {
            customer_name: "Ole Bach".into(),
            customer_email: email.map(str::to_string),
            inspection_date: NaiveDate::from_ymd_opt(2026, 8, 20),
            roof_type: Some(RoofType::Flat),
            ..Default::default()
        }
        .into_report("b1", "inspector-7", status, Utc::now())
        .unwrap()
    }

    fn notifier(enabled: bool) -> (Database, Notifier) {
        let db = Database::in_memory().unwrap();
        let config = NotificationsConfig { enabled, ..Default::default() };
        (db.clone(), Notifier::new(db, config))
    }

    #[test]
    fn test_sent_report_emails_customer() {
        let (db, notifier) = notifier(true);
        notifier.report_status_changed(&report(Some("ole@example.dk"), ReportStatus::Sent)).unwrap();

        let queued = db.list_mail("b1").unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].to, "ole@example.dk");
        assert_eq!(queued[0].data["from"], "noreply@roofdesk.local");
    }

    #[test]
    fn test_sent_report_without_email_is_silent() {
        let (db, notifier) = notifier(true);
        assert!(notifier.report_status_changed(&report(None, ReportStatus::Sent)).is_none());
        assert!(notifier.report_status_changed(&report(Some("  "), ReportStatus::Sent)).is_none());
        assert!(db.list_mail("b1").unwrap().is_empty());
    }

    #[test]
    fn test_disabled_notifications_queue_nothing() {
        let (db, notifier) = notifier(false);
        assert!(notifier.report_status_changed(&report(Some("ole@example.dk"), ReportStatus::Sent)).is_none());
        assert!(db.list_mail("b1").unwrap().is_empty());
    }

    #[test]
    fn test_completed_respects_author_preference() {
        let (db, notifier) = notifier(true);
        let r = report(None, ReportStatus::Completed);
        assert!(notifier.report_status_changed(&r).is_some());

        let mut prefs = NotificationPreferences::defaults_for("inspector-7");
        prefs.report_completed = false;
        db.save_preferences(&prefs).unwrap();
        assert!(notifier.report_status_changed(&r).is_none());

        let queued = db.list_mail("b1").unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].to, "user:inspector-7");
    }

    #[test]
    fn test_queue_failure_is_swallowed() {
        let (db, notifier) = notifier(true);
        db.lock().unwrap().execute_batch("DROP TABLE mail_queue").unwrap();
        assert!(notifier
            .enqueue_email("b1", "ole@example.dk", EmailTemplate::ReportSent, json!({}))
            .is_none());
    }
}
