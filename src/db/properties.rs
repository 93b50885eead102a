use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::Database;
use crate::error::{LeadError, Result};
use crate::models::*;
use crate::store::{PropertySort, PropertyStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Helper to convert UUID parse errors to rusqlite errors
pub(super) fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Stored calendar dates are read softly: anything unparseable becomes `None`.
pub(super) fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

pub(super) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// A corrupt stored timestamp reads as the epoch.
pub(super) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

impl Database {
    // ==================== PROPERTY WRITE ====================

    pub(super) fn insert_property(&self, property: &Property) -> Result<()> {
        self.conn.execute(
            r#"INSERT INTO properties (
                id, address, city, price, posting_date, property_type, bedrooms,
                bathrooms, square_feet, is_still_listed, owner_name, owner_phone,
                owner_email, lead_status, last_contact_date, notes, listing_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                property.id.to_string(),
                property.address,
                property.city,
                property.price,
                format_date(property.posting_date),
                property.property_type.as_str(),
                property.bedrooms,
                property.bathrooms,
                property.square_feet,
                property.is_still_listed as i32,
                property.owner_name,
                property.owner_phone,
                property.owner_email,
                property.lead_status.as_str(),
                format_date(property.last_contact_date),
                property.notes,
                property.listing_url,
                property.created_at.to_rfc3339(),
                property.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Overwrite every mutable column of an existing row.
    pub(super) fn write_property(&self, property: &Property) -> Result<()> {
        let rows = self.conn.execute(
            r#"UPDATE properties SET
                address = ?, city = ?, price = ?, posting_date = ?, property_type = ?,
                bedrooms = ?, bathrooms = ?, square_feet = ?, is_still_listed = ?,
                owner_name = ?, owner_phone = ?, owner_email = ?, lead_status = ?,
                last_contact_date = ?, notes = ?, listing_url = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                property.address,
                property.city,
                property.price,
                format_date(property.posting_date),
                property.property_type.as_str(),
                property.bedrooms,
                property.bathrooms,
                property.square_feet,
                property.is_still_listed as i32,
                property.owner_name,
                property.owner_phone,
                property.owner_email,
                property.lead_status.as_str(),
                format_date(property.last_contact_date),
                property.notes,
                property.listing_url,
                property.updated_at.to_rfc3339(),
                property.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(LeadError::PropertyNotFound(property.id));
        }
        Ok(())
    }

    // ==================== ROW MAPPERS ====================

    fn row_to_property(row: &Row) -> rusqlite::Result<Property> {
        let id: String = row.get("id")?;
        let property_type: String = row.get("property_type")?;
        let lead_status: String = row.get("lead_status")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        Ok(Property {
            id: parse_uuid(&id)?,
            address: row.get("address")?,
            city: row.get("city")?,
            price: row.get("price")?,
            posting_date: parse_date(row.get("posting_date")?),
            property_type: PropertyType::parse(&property_type),
            bedrooms: row.get("bedrooms")?,
            bathrooms: row.get("bathrooms")?,
            square_feet: row.get("square_feet")?,
            is_still_listed: row.get::<_, i32>("is_still_listed")? == 1,
            owner_name: row.get("owner_name")?,
            owner_phone: row.get("owner_phone")?,
            owner_email: row.get("owner_email")?,
            lead_status: LeadStatus::parse(&lead_status),
            last_contact_date: parse_date(row.get("last_contact_date")?),
            notes: row.get("notes")?,
            listing_url: row.get("listing_url")?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

impl PropertyStore for Database {
    fn list_properties(&self, sort: PropertySort) -> Result<Vec<Property>> {
        // ORDER BY comes from a fixed column whitelist, never from user text
        let sql = format!("SELECT * FROM properties ORDER BY {}", sort.to_sql());
        let mut stmt = self.conn.prepare(&sql)?;

        let properties = stmt
            .query_map([], Self::row_to_property)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = properties.len(), "listed properties");
        Ok(properties)
    }

    fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        let mut stmt = self.conn.prepare("SELECT * FROM properties WHERE id = ?")?;
        let property = stmt
            .query_row([id.to_string()], Self::row_to_property)
            .optional()?;
        Ok(property)
    }

    fn create_property(&self, property: Property) -> Result<Property> {
        property.validate()?;
        self.insert_property(&property)?;
        info!(property_id = %property.id, address = %property.address, "property created");
        Ok(property)
    }

    fn update_property(&self, id: Uuid, patch: &PropertyPatch, now: DateTime<Utc>) -> Result<Property> {
        let current = self
            .get_property(id)?
            .ok_or(LeadError::PropertyNotFound(id))?;
        let updated = patch.apply_to(&current, now)?;
        self.write_property(&updated)?;
        info!(property_id = %id, "property updated");
        Ok(updated)
    }

    /// Hard delete a property and its contact logs (via CASCADE).
    fn delete_property(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM properties WHERE id = ?", [id.to_string()])?;
        if rows > 0 {
            info!(property_id = %id, "property deleted");
        }
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContactLogStore;
    use chrono::TimeZone;

    fn sample_property(address: &str) -> Property {
        let mut p = Property::new(address);
        p.city = "Anytown".to_string();
        p.owner_name = "John Doe".to_string();
        p.price = Some(450_000.0);
        p.posting_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        p.bedrooms = Some(3.0);
        p.bathrooms = Some(2.5);
        p.square_feet = Some(1800);
        p
    }

    #[test]
    fn test_insert_and_get_property() {
        let db = Database::open_memory().unwrap();
        let p = sample_property("123 Main St");
        db.create_property(p.clone()).unwrap();

        let retrieved = db.get_property(p.id).unwrap().unwrap();
        assert_eq!(retrieved.address, "123 Main St");
        assert_eq!(retrieved.price, Some(450_000.0));
        assert_eq!(retrieved.posting_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(retrieved.bathrooms, Some(2.5));
        assert_eq!(retrieved.square_feet, Some(1800));
        assert!(retrieved.is_still_listed);
        assert_eq!(retrieved.lead_status, LeadStatus::New);
    }

    #[test]
    fn test_get_missing_property() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_property(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_list_properties_sorted() {
        let db = Database::open_memory().unwrap();
        for (address, price) in [("B St", 200.0), ("a St", 300.0), ("C St", 100.0)] {
            let mut p = sample_property(address);
            p.price = Some(price);
            db.create_property(p).unwrap();
        }

        let by_price = db.list_properties("-price".parse().unwrap()).unwrap();
        let addresses: Vec<_> = by_price.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["a St", "B St", "C St"]);

        let by_address = db.list_properties("address".parse().unwrap()).unwrap();
        let addresses: Vec<_> = by_address.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["a St", "B St", "C St"]);
    }

    #[test]
    fn test_update_property() {
        let db = Database::open_memory().unwrap();
        let p = sample_property("123 Main St");
        db.create_property(p.clone()).unwrap();

        let patch = PropertyPatch {
            is_still_listed: Some(false),
            owner_phone: Some(Some("(555) 123-4567".to_string())),
            price: Some(None),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let updated = db.update_property(p.id, &patch, now).unwrap();
        assert!(!updated.is_still_listed);

        let stored = db.get_property(p.id).unwrap().unwrap();
        assert!(!stored.is_still_listed);
        assert_eq!(stored.owner_phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(stored.price, None);
        assert_eq!(stored.updated_at, now);
    }

    #[test]
    fn test_update_missing_property() {
        let db = Database::open_memory().unwrap();
        let err = db
            .update_property(Uuid::new_v4(), &PropertyPatch::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LeadError::PropertyNotFound(_)));
    }

    #[test]
    fn test_unparseable_posting_date_reads_as_none() {
        let db = Database::open_memory().unwrap();
        let p = sample_property("123 Main St");
        db.create_property(p.clone()).unwrap();

        db.conn
            .execute(
                "UPDATE properties SET posting_date = 'last tuesday', lead_status = 'bogus' WHERE id = ?",
                [p.id.to_string()],
            )
            .unwrap();

        let stored = db.get_property(p.id).unwrap().unwrap();
        assert!(stored.posting_date.is_none());
        assert_eq!(stored.lead_status, LeadStatus::New);
    }

    #[test]
    fn test_delete_property_cascades() {
        let db = Database::open_memory().unwrap();
        let p = sample_property("123 Main St");
        db.create_property(p.clone()).unwrap();
        db.create_contact_log(ContactLog::new(
            p.id,
            NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
            ContactMethod::Phone,
            ContactOutcome::Voicemail,
        ))
        .unwrap();

        assert!(db.delete_property(p.id).unwrap());
        assert!(db.get_property(p.id).unwrap().is_none());
        assert!(db.list_contact_logs(Some(p.id)).unwrap().is_empty());
        assert!(!db.delete_property(p.id).unwrap());
    }

    #[test]
    fn test_create_rejects_negative_price() {
        let db = Database::open_memory().unwrap();
        let mut p = sample_property("123 Main St");
        p.price = Some(-1.0);
        assert!(matches!(db.create_property(p), Err(LeadError::Validation(_))));
        assert!(db.list_properties(PropertySort::default()).unwrap().is_empty());
    }
}
