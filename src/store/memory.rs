use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ContactLogStore, LeadStore, PropertySort, PropertyStore};
use crate::error::{LeadError, Result};
use crate::models::{
    ContactLog, ContactLogPatch, ContactMethod, ContactOutcome, LeadStatus, Property,
    PropertyPatch, PropertyType,
};

#[derive(Debug, Default)]
struct Tables {
    properties: Vec<Property>,
    contact_logs: Vec<ContactLog>,
}

/// In-process store. Every write holds the lock for its whole duration, so
/// two contact commits on the same property never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with sample listings dated relative to `now`, so the
    /// hot-lead views always have something to show.
    pub fn with_sample_data(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let listing = |address: &str,
                       city: &str,
                       owner: &str,
                       days_listed: i64,
                       price: f64,
                       status: LeadStatus| {
            let mut p = Property::new(address);
            p.city = city.to_string();
            p.owner_name = owner.to_string();
            p.posting_date = Some(today - Duration::days(days_listed));
            p.price = Some(price);
            p.lead_status = status;
            p.created_at = now - Duration::days(days_listed.min(10));
            p.updated_at = p.created_at;
            p
        };

        let mut main_st = listing("123 Main St", "Anytown", "John Doe", 35, 450_000.0, LeadStatus::ReadyToContact);
        main_st.owner_phone = Some("(555) 123-4567".to_string());
        main_st.owner_email = Some("john@example.com".to_string());
        main_st.bedrooms = Some(3.0);
        main_st.bathrooms = Some(2.0);
        main_st.square_feet = Some(1800);
        main_st.notes = Some("Owner motivated to sell quickly".to_string());

        let mut oak_ave = listing("456 Oak Ave", "Somewhere", "Jane Smith", 28, 520_000.0, LeadStatus::Contacted);
        oak_ave.owner_phone = Some("(555) 987-6543".to_string());
        oak_ave.owner_email = Some("jane@example.com".to_string());
        oak_ave.bedrooms = Some(4.0);
        oak_ave.bathrooms = Some(3.0);
        oak_ave.square_feet = Some(2200);
        oak_ave.last_contact_date = Some(today - Duration::days(2));
        oak_ave.notes = Some("Interested in selling, needs quick close".to_string());

        let mut pine_rd = listing("789 Pine Rd", "Anytown", "Luis Ortega", 22, 389_000.0, LeadStatus::New);
        pine_rd.property_type = PropertyType::Townhouse;
        pine_rd.owner_phone = Some("(555) 222-0199".to_string());

        let mut birch_ct = listing("12 Birch Ct", "Lakeside", "Amira Haddad", 16, 305_000.0, LeadStatus::New);
        birch_ct.property_type = PropertyType::Condo;
        birch_ct.owner_email = Some("amira@example.com".to_string());

        let mut cedar_ln = listing("5 Cedar Ln", "Lakeside", "Priya Nair", 3, 612_000.0, LeadStatus::New);
        cedar_ln.property_type = PropertyType::Duplex;

        let mut lot_9 = listing("Lot 9 County Rd", "Ridgeview", "Sam Becker", 60, 95_000.0, LeadStatus::Converted);
        lot_9.property_type = PropertyType::Land;
        lot_9.is_still_listed = false;

        let logs = vec![
            {
                let mut log = ContactLog::new(
                    oak_ave.id,
                    today - Duration::days(4),
                    ContactMethod::Phone,
                    ContactOutcome::Voicemail,
                );
                log.notes = Some("Left message asking for callback".to_string());
                log.follow_up_date = Some(today - Duration::days(2));
                log
            },
            {
                let mut log = ContactLog::new(
                    oak_ave.id,
                    today - Duration::days(2),
                    ContactMethod::Email,
                    ContactOutcome::Interested,
                );
                log.notes = Some("Owner responded via email, interested in selling".to_string());
                log.follow_up_date = Some(today + Duration::days(1));
                log
            },
        ];

        Self {
            tables: Mutex::new(Tables {
                properties: vec![main_st, oak_ave, pine_rd, birch_ct, cedar_ln, lot_9],
                contact_logs: logs,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| LeadError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl PropertyStore for MemoryStore {
    fn list_properties(&self, sort: PropertySort) -> Result<Vec<Property>> {
        let tables = self.lock()?;
        let mut properties = tables.properties.clone();
        properties.sort_by(|a, b| sort.compare(a, b));
        debug!(count = properties.len(), "listed properties");
        Ok(properties)
    }

    fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        let tables = self.lock()?;
        Ok(tables.properties.iter().find(|p| p.id == id).cloned())
    }

    fn create_property(&self, property: Property) -> Result<Property> {
        property.validate()?;
        let mut tables = self.lock()?;
        if tables.properties.iter().any(|p| p.id == property.id) {
            return Err(LeadError::validation(format!("duplicate property id: {}", property.id)));
        }
        tables.properties.push(property.clone());
        info!(property_id = %property.id, address = %property.address, "property created");
        Ok(property)
    }

    fn update_property(&self, id: Uuid, patch: &PropertyPatch, now: DateTime<Utc>) -> Result<Property> {
        let mut tables = self.lock()?;
        let slot = tables
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LeadError::PropertyNotFound(id))?;
        let updated = patch.apply_to(slot, now)?;
        *slot = updated.clone();
        info!(property_id = %id, "property updated");
        Ok(updated)
    }

    fn delete_property(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock()?;
        let before = tables.properties.len();
        tables.properties.retain(|p| p.id != id);
        let removed = tables.properties.len() < before;
        if removed {
            tables.contact_logs.retain(|log| log.property_id != id);
            info!(property_id = %id, "property deleted");
        }
        Ok(removed)
    }
}

impl ContactLogStore for MemoryStore {
    fn list_contact_logs(&self, property_id: Option<Uuid>) -> Result<Vec<ContactLog>> {
        let tables = self.lock()?;
        let mut logs: Vec<ContactLog> = tables
            .contact_logs
            .iter()
            .filter(|log| property_id.map_or(true, |id| log.property_id == id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            b.contact_date
                .cmp(&a.contact_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(logs)
    }

    fn create_contact_log(&self, log: ContactLog) -> Result<ContactLog> {
        let mut tables = self.lock()?;
        if !tables.properties.iter().any(|p| p.id == log.property_id) {
            return Err(LeadError::PropertyNotFound(log.property_id));
        }
        tables.contact_logs.push(log.clone());
        info!(log_id = %log.id, property_id = %log.property_id, "contact log created");
        Ok(log)
    }

    fn update_contact_log(&self, id: Uuid, patch: &ContactLogPatch) -> Result<ContactLog> {
        let mut tables = self.lock()?;
        let slot = tables
            .contact_logs
            .iter_mut()
            .find(|log| log.id == id)
            .ok_or(LeadError::ContactLogNotFound(id))?;
        *slot = patch.apply_to(slot);
        Ok(slot.clone())
    }

    fn delete_contact_log(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.lock()?;
        let before = tables.contact_logs.len();
        tables.contact_logs.retain(|log| log.id != id);
        Ok(tables.contact_logs.len() < before)
    }
}

impl LeadStore for MemoryStore {
    fn commit_contact(&self, log: ContactLog, now: DateTime<Utc>) -> Result<(ContactLog, Property)> {
        let mut tables = self.lock()?;
        let index = tables
            .properties
            .iter()
            .position(|p| p.id == log.property_id)
            .ok_or(LeadError::PropertyNotFound(log.property_id))?;

        // Compute the new property before touching either table.
        let current = &tables.properties[index];
        let updated = PropertyPatch::for_contact(current, log.contact_date).apply_to(current, now)?;
        tables.properties[index] = updated.clone();
        tables.contact_logs.push(log.clone());

        info!(log_id = %log.id, property_id = %updated.id, status = updated.lead_status.as_str(), "contact committed");
        Ok((log, updated))
    }
}
