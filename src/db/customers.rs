use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::errors::RoofdeskError;
use crate::models::{Customer, CustomerInput};
use super::connection::{enum_at, enum_tag, timestamp_at};
use super::Database;

const CUSTOMER_COLUMNS: &str =
    "id, branch_id, name, email, phone, address, company, customer_type, notes, created_at";

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        branch_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        company: row.get(6)?,
        customer_type: enum_at(row, 7)?,
        notes: row.get(8)?,
        created_at: timestamp_at(row, 9)?,
    })
}

fn require_name(input: &CustomerInput) -> Result<String, RoofdeskError> {
    let name = input.name.trim();
    if name.is_empty() {
        let mut errors = crate::errors::FieldErrors::new();
        errors.insert("name".into(), "Customer name is required".into());
        return Err(RoofdeskError::Validation(errors));
    }
    Ok(name.to_string())
}

impl Database {
    pub fn create_customer(
        &self,
        branch_id: &str,
        input: &CustomerInput,
        now: DateTime<Utc>,
    ) -> Result<Customer, RoofdeskError> {
        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            name: require_name(input)?,
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            company: input.company.clone(),
            customer_type: input.customer_type,
            notes: input.notes.clone(),
            created_at: now,
        };

        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO customers ({CUSTOMER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            rusqlite::params![
                customer.id,
                customer.branch_id,
                customer.name,
                customer.email,
                customer.phone,
                customer.address,
                customer.company,
                enum_tag(&customer.customer_type)?,
                customer.notes,
                customer.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to create customer: {}", e)))?;
        Ok(customer)
    }

    pub fn get_customer(&self, branch_id: &str, id: &str) -> Result<Option<Customer>, RoofdeskError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND branch_id = ?2"),
            rusqlite::params![id, branch_id],
            customer_from_row,
        );

        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RoofdeskError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn list_customers(&self, branch_id: &str) -> Result<Vec<Customer>, RoofdeskError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE branch_id = ?1 ORDER BY name COLLATE NOCASE"
            ))
            .map_err(|e| RoofdeskError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![branch_id], customer_from_row)
            .map_err(|e| RoofdeskError::Database(format!("Query error: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RoofdeskError::Database(format!("Row error: {}", e)))?);
        }
        Ok(results)
    }

    /// Overwrite the editable fields. Returns `None` if the customer is not in this branch.
    pub fn update_customer(
        &self,
        branch_id: &str,
        id: &str,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, RoofdeskError> {
        let name = require_name(input)?;
        let affected = {
            let conn = self.lock()?;
            conn.execute(
                "UPDATE customers SET name = ?3, email = ?4, phone = ?5, address = ?6, company = ?7,
                 customer_type = ?8, notes = ?9 WHERE id = ?1 AND branch_id = ?2",
                rusqlite::params![
                    id,
                    branch_id,
                    name,
                    input.email,
                    input.phone,
                    input.address,
                    input.company,
                    enum_tag(&input.customer_type)?,
                    input.notes,
                ],
            )
            .map_err(|e| RoofdeskError::Database(format!("Update failed: {}", e)))?
        };

        if affected == 0 {
            return Ok(None);
        }
        self.get_customer(branch_id, id)
    }
}
