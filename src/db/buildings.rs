use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::errors::RoofdeskError;
use crate::models::{Building, BuildingInput};
use super::connection::{enum_tag, optional_enum_at, timestamp_at};
use super::Database;

const BUILDING_COLUMNS: &str = "id, branch_id, customer_id, address, latitude, longitude, roof_type, roof_size_m2, building_type, created_at";

fn building_from_row(row: &Row<'_>) -> rusqlite::Result<Building> {
    Ok(Building {
        id: row.get(0)?,
        branch_id: row.get(1)?,
        customer_id: row.get(2)?,
        address: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        roof_type: optional_enum_at(row, 6)?,
        roof_size_m2: row.get(7)?,
        building_type: row.get(8)?,
        created_at: timestamp_at(row, 9)?,
    })
}

impl Database {
    /// Create a building for a customer of the same branch.
    pub fn create_building(
        &self,
        branch_id: &str,
        input: &BuildingInput,
        now: DateTime<Utc>,
    ) -> Result<Building, RoofdeskError> {
        if self.get_customer(branch_id, &input.customer_id)?.is_none() {
            return Err(RoofdeskError::NotFound(format!("customer {}", input.customer_id)));
        }
        if input.address.trim().is_empty() {
            let mut errors = crate::errors::FieldErrors::new();
            errors.insert("address".into(), "Address is required".into());
            return Err(RoofdeskError::Validation(errors));
        }

        let building = Building {
            id: uuid::Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            customer_id: input.customer_id.clone(),
            address: input.address.trim().to_string(),
            latitude: input.latitude,
            longitude: input.longitude,
            roof_type: input.roof_type,
            roof_size_m2: input.roof_size_m2,
            building_type: input.building_type.clone(),
            created_at: now,
        };
        let roof_type = building.roof_type.as_ref().map(enum_tag).transpose()?;

        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO buildings ({BUILDING_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            rusqlite::params![
                building.id,
                building.branch_id,
                building.customer_id,
                building.address,
                building.latitude,
                building.longitude,
                roof_type,
                building.roof_size_m2,
                building.building_type,
                building.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RoofdeskError::Database(format!("Failed to create building: {}", e)))?;
        Ok(building)
    }

    pub fn get_building(&self, branch_id: &str, id: &str) -> Result<Option<Building>, RoofdeskError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            &format!("SELECT {BUILDING_COLUMNS} FROM buildings WHERE id = ?1 AND branch_id = ?2"),
            rusqlite::params![id, branch_id],
            building_from_row,
        );

        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RoofdeskError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn list_buildings(
        &self,
        branch_id: &str,
        customer_id: Option<&str>,
    ) -> Result<Vec<Building>, RoofdeskError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BUILDING_COLUMNS} FROM buildings
                 WHERE branch_id = ?1 AND (?2 IS NULL OR customer_id = ?2)
                 ORDER BY created_at"
            ))
            .map_err(|e| RoofdeskError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![branch_id, customer_id], building_from_row)
            .map_err(|e| RoofdeskError::Database(format!("Query error: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RoofdeskError::Database(format!("Row error: {}", e)))?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerInput, RoofType};

    fn setup() -> (Database, String) {
        let db = Database::in_memory().unwrap();
        let customer = db
            .create_customer("b1", &CustomerInput { name: "Larsen".into(), ..Default::default() }, Utc::now())
            .unwrap();
        (db, customer.id)
    }

    fn building(customer_id: &str, address: &str) -> BuildingInput {
        BuildingInput {
            customer_id: customer_id.to_string(),
            address: address.to_string(),
            latitude: Some(55.676),
            longitude: Some(12.568),
            roof_type: Some(RoofType::Tile),
            roof_size_m2: Some(140.0),
            building_type: Some("villa".into()),
        }
    }

    #[test]
    fn test_create_and_list_by_customer() {
        let (db, customer_id) = setup();
        let other = db
            .create_customer("b1", &CustomerInput { name: "Møller".into(), ..Default::default() }, Utc::now())
            .unwrap();

        let created = db.create_building("b1", &building(&customer_id, "Strandvejen 4"), Utc::now()).unwrap();
        db.create_building("b1", &building(&other.id, "Havnegade 9"), Utc::now()).unwrap();

        let fetched = db.get_building("b1", &created.id).unwrap().unwrap();
        assert_eq!(fetched.roof_type, Some(RoofType::Tile));

        assert_eq!(db.list_buildings("b1", None).unwrap().len(), 2);
        let mine = db.list_buildings("b1", Some(&customer_id)).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].address, "Strandvejen 4");
    }

    #[test]
    fn test_building_requires_customer_in_branch() {
        let (db, customer_id) = setup();
        let err = db.create_building("b2", &building(&customer_id, "Torvet 1"), Utc::now()).unwrap_err();
        assert!(matches!(err, RoofdeskError::NotFound(_)));
    }

    #[test]
    fn test_building_not_visible_from_other_branch() {
        let (db, customer_id) = setup();
        let created = db.create_building("b1", &building(&customer_id, "Torvet 1"), Utc::now()).unwrap();
        assert!(db.get_building("b2", &created.id).unwrap().is_none());
        assert!(db.list_buildings("b2", None).unwrap().is_empty());
    }
}
