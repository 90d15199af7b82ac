use crate::errors::RoofdeskError;
use crate::models::Branch;
use super::connection::timestamp_at;
use super::Database;

impl Database {
    pub fn get_branch(&self, id: &str) -> Result<Option<Branch>, RoofdeskError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT id, name, address, email, created_at FROM branches WHERE id = ?1",
            rusqlite::params![id],
            |row| {
                Ok(Branch {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                    email: row.get(3)?,
                    created_at: timestamp_at(row, 4)?,
                })
            },
        );

        match result {
            Ok(branch) => Ok(Some(branch)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RoofdeskError::Database(format!("Query error: {}", e))),
        }
    }

    /// Insert or replace branch details. `created_at` of an existing row is kept.
    pub fn upsert_branch(&self, branch: &Branch) -> Result<(), RoofdeskError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO branches (id, name, address, email, created_at) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, address = excluded.address, email = excluded.email",
            rusqlite::params![
                branch.id,
                branch.name,
                branch.address,
                branch.email,
                branch.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to save branch: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_upsert_branch_keeps_created_at() {
        let db = Database::in_memory().unwrap();
        let created = Utc::now() - chrono::Duration::days(10);
        let mut branch = Branch {
            id: "aarhus".into(),
            name: "Tagteam Aarhus".into(),
            address: None,
            email: None,
            created_at: created,
        };
        db.upsert_branch(&branch).unwrap();

        branch.name = "Tagteam Østjylland".into();
        branch.created_at = Utc::now();
        db.upsert_branch(&branch).unwrap();

        let stored = db.get_branch("aarhus").unwrap().unwrap();
        assert_eq!(stored.name, "Tagteam Østjylland");
        assert_eq!(stored.created_at.timestamp(), created.timestamp());
        assert!(db.get_branch("odense").unwrap().is_none());
    }
}
