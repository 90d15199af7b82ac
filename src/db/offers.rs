use chrono::NaiveDate;
use rusqlite::Row;

use crate::errors::RoofdeskError;
use crate::models::Offer;
use super::connection::{enum_at, enum_tag, is_constraint_violation, optional_timestamp_at, timestamp_at};
use super::Database;

const OFFER_COLUMNS: &str = "id, report_id, branch_id, customer_name, customer_email, title, description, \
    labor_cost, material_cost, travel_cost, overhead_cost, actions_cost, subtotal, vat_rate, vat_amount, \
    total_amount, currency, valid_until, status, created_at, responded_at";

fn offer_from_row(row: &Row<'_>) -> rusqlite::Result<Offer> {
    let valid_until: String = row.get(17)?;
    let valid_until = NaiveDate::parse_from_str(&valid_until, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(17, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Offer {
        id: row.get(0)?,
        report_id: row.get(1)?,
        branch_id: row.get(2)?,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        labor_cost: row.get(7)?,
        material_cost: row.get(8)?,
        travel_cost: row.get(9)?,
        overhead_cost: row.get(10)?,
        actions_cost: row.get(11)?,
        subtotal: row.get(12)?,
        vat_rate: row.get(13)?,
        vat_amount: row.get(14)?,
        total_amount: row.get(15)?,
        currency: row.get(16)?,
        valid_until,
        status: enum_at(row, 18)?,
        created_at: timestamp_at(row, 19)?,
        responded_at: optional_timestamp_at(row, 20)?,
    })
}

impl Database {
    /// Store a new offer. A report can carry only one offer.
    pub fn insert_offer(&self, offer: &Offer) -> Result<(), RoofdeskError> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO offers ({OFFER_COLUMNS}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
            ),
            rusqlite::params![
                offer.id,
                offer.report_id,
                offer.branch_id,
                offer.customer_name,
                offer.customer_email,
                offer.title,
                offer.description,
                offer.labor_cost,
                offer.material_cost,
                offer.travel_cost,
                offer.overhead_cost,
                offer.actions_cost,
                offer.subtotal,
                offer.vat_rate,
                offer.vat_amount,
                offer.total_amount,
                offer.currency,
                offer.valid_until.format("%Y-%m-%d").to_string(),
                enum_tag(&offer.status)?,
                offer.created_at.to_rfc3339(),
                offer.responded_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                RoofdeskError::BadRequest(format!("An offer already exists for report {}", offer.report_id))
            } else {
                RoofdeskError::Database(format!("Failed to create offer: {}", e))
            }
        })?;
        Ok(())
    }

    pub fn get_offer(&self, branch_id: &str, id: &str) -> Result<Option<Offer>, RoofdeskError> {
        self.query_offer("id = ?1 AND branch_id = ?2", id, branch_id)
    }

    pub fn get_offer_for_report(&self, branch_id: &str, report_id: &str) -> Result<Option<Offer>, RoofdeskError> {
        self.query_offer("report_id = ?1 AND branch_id = ?2", report_id, branch_id)
    }

    fn query_offer(&self, condition: &str, key: &str, branch_id: &str) -> Result<Option<Offer>, RoofdeskError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            &format!("SELECT {OFFER_COLUMNS} FROM offers WHERE {condition}"),
            rusqlite::params![key, branch_id],
            offer_from_row,
        );

        match result {
            Ok(offer) => Ok(Some(offer)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RoofdeskError::Database(format!("Query error: {}", e))),
        }
    }

    /// Persist the status and response time of an offer.
    pub fn update_offer_status(&self, offer: &Offer) -> Result<bool, RoofdeskError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "UPDATE offers SET status = ?3, responded_at = ?4 WHERE id = ?1 AND branch_id = ?2",
                rusqlite::params![
                    offer.id,
                    offer.branch_id,
                    enum_tag(&offer.status)?,
                    offer.responded_at.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(|e| RoofdeskError::Database(format!("Update failed: {}", e)))?;
        Ok(affected > 0)
    }
}
