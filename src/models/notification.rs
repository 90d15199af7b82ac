use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub user_id: String,
    pub email_enabled: bool,
    pub report_completed: bool,
    pub offer_updates: bool,
    pub weekly_summary: bool,
}

impl NotificationPreferences {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email_enabled: true,
            report_completed: true,
            offer_updates: true,
            weekly_summary: false,
        }
    }

    pub fn wants(&self, template: EmailTemplate) -> bool {
        if !self.email_enabled {
            return false;
        }
        match template {
            EmailTemplate::ReportCompleted => self.report_completed,
            EmailTemplate::OfferResponse => self.offer_updates,
            // Customer-facing mail is not governed by inspector preferences
            EmailTemplate::ReportSent | EmailTemplate::OfferCreated => true,
        }
    }
}

/// Partial update of preferences; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub email_enabled: Option<bool>,
    pub report_completed: Option<bool>,
    pub offer_updates: Option<bool>,
    pub weekly_summary: Option<bool>,
}

impl NotificationPreferences {
    pub fn apply(&mut self, patch: &PreferencesPatch) {
        if let Some(v) = patch.email_enabled {
            self.email_enabled = v;
        }
        if let Some(v) = patch.report_completed {
            self.report_completed = v;
        }
        if let Some(v) = patch.offer_updates {
            self.offer_updates = v;
        }
        if let Some(v) = patch.weekly_summary {
            self.weekly_summary = v;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    ReportSent,
    ReportCompleted,
    OfferCreated,
    OfferResponse,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReportSent => "report_sent",
            Self::ReportCompleted => "report_completed",
            Self::OfferCreated => "offer_created",
            Self::OfferResponse => "offer_response",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEmail {
    pub id: String,
    pub branch_id: String,
    pub to: String,
    pub template: String,
    pub data: serde_json::Value,
    pub status: String,
    pub created_at: String,
}
