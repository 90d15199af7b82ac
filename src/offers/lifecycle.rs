use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::config::OffersConfig;
use crate::db::Database;
use crate::errors::RoofdeskError;
use crate::models::{Offer, OfferDecision, OfferStatus, ReportStatus};
use crate::notifications::Notifier;
use super::pricing::derive_offer;

/// Report status that mirrors an offer status.
pub fn report_status_for(status: OfferStatus) -> ReportStatus {
    match status {
        OfferStatus::Pending => ReportStatus::OfferSent,
        OfferStatus::Accepted => ReportStatus::OfferAccepted,
        OfferStatus::Rejected => ReportStatus::OfferRejected,
        OfferStatus::Expired => ReportStatus::OfferExpired,
    }
}

/// The offer as it reads on `today`, with lapsed pending offers shown as expired.
pub fn with_effective_status(mut offer: Offer, today: NaiveDate) -> Offer {
    offer.status = offer.effective_status(today);
    offer
}

/// Price a report, store the offer and mark the report `offer_sent`.
pub fn create_offer(
    db: &Database,
    notifier: &Notifier,
    branch_id: &str,
    report_id: &str,
    settings: &OffersConfig,
    now: DateTime<Utc>,
) -> Result<Offer, RoofdeskError> {
    let mut report = db
        .get_report(branch_id, report_id)?
        .ok_or_else(|| RoofdeskError::NotFound(format!("report {}", report_id)))?;

    if report.status == ReportStatus::Archived {
        return Err(RoofdeskError::BadRequest("Archived reports cannot receive offers".into()));
    }
    if db.get_offer_for_report(branch_id, report_id)?.is_some() {
        return Err(RoofdeskError::BadRequest(format!("An offer already exists for report {}", report_id)));
    }

    let offer = derive_offer(&report, settings, now)?;
    db.insert_offer(&offer)?;

    report.status = report_status_for(offer.status);
    report.last_edited = now;
    db.save_report(&report)?;

    info!(offer_id = %offer.id, report_id, total = offer.total_amount, "Offer created");
    notifier.offer_created(&offer);
    Ok(offer)
}

/// Record the customer's answer and mirror it onto the report.
///
/// Only pending offers can be answered. Answering a lapsed offer stores it
/// as expired and fails.
pub fn respond_to_offer(
    db: &Database,
    notifier: &Notifier,
    branch_id: &str,
    offer_id: &str,
    decision: OfferDecision,
    now: DateTime<Utc>,
) -> Result<Offer, RoofdeskError> {
    let mut offer = db
        .get_offer(branch_id, offer_id)?
        .ok_or_else(|| RoofdeskError::NotFound(format!("offer {}", offer_id)))?;

    match offer.effective_status(now.date_naive()) {
        OfferStatus::Pending => {
            offer.status = match decision {
                OfferDecision::Accept => OfferStatus::Accepted,
                OfferDecision::Reject => OfferStatus::Rejected,
            };
            offer.responded_at = Some(now);
        }
        OfferStatus::Expired if offer.status == OfferStatus::Pending => {
            offer.status = OfferStatus::Expired;
            db.update_offer_status(&offer)?;
            mirror_to_report(db, &offer, now)?;
            return Err(RoofdeskError::BadRequest(format!("Offer expired on {}", offer.valid_until)));
        }
        settled => {
            return Err(RoofdeskError::BadRequest(format!("Offer is already {}", settled.as_str())));
        }
    }

    db.update_offer_status(&offer)?;
    let author = mirror_to_report(db, &offer, now)?;
    info!(offer_id, status = offer.status.as_str(), "Offer answered");

    if let Some(author) = author {
        notifier.offer_responded(&offer, &author);
    }
    Ok(offer)
}

/// Write the offer status onto its report; returns the report author if the report exists.
fn mirror_to_report(db: &Database, offer: &Offer, now: DateTime<Utc>) -> Result<Option<String>, RoofdeskError> {
    let Some(mut report) = db.get_report(&offer.branch_id, &offer.report_id)? else {
        return Ok(None);
    };
    report.status = report_status_for(offer.status);
    report.last_edited = now;
    db.save_report(&report)?;
    Ok(Some(report.created_by))
}
