use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction, TransactionBehavior};
use tracing::info;
use uuid::Uuid;

use super::properties::{format_date, parse_date, parse_timestamp, parse_uuid};
use super::Database;
use crate::error::{LeadError, Result};
use crate::models::*;
use crate::store::{ContactLogStore, LeadStore, PropertyStore};

const LOG_COLUMNS: &str =
    "id, property_id, contact_date, contact_method, outcome, notes, follow_up_date, created_at";

impl Database {
    fn insert_contact_log(&self, log: &ContactLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO contact_logs (id, property_id, contact_date, contact_method, outcome,
                                       notes, follow_up_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                log.id.to_string(),
                log.property_id.to_string(),
                format_date(Some(log.contact_date)),
                log.contact_method.as_str(),
                log.outcome.as_str(),
                log.notes,
                format_date(log.follow_up_date),
                log.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_contact_log(&self, id: Uuid) -> Result<Option<ContactLog>> {
        let sql = format!("SELECT {} FROM contact_logs WHERE id = ?", LOG_COLUMNS);
        let log = self
            .conn
            .query_row(&sql, [id.to_string()], Self::row_to_contact_log)
            .optional()?;
        Ok(log)
    }

    fn row_to_contact_log(row: &Row) -> rusqlite::Result<ContactLog> {
        let id: String = row.get(0)?;
        let property_id: String = row.get(1)?;
        let method: String = row.get(3)?;
        let outcome: String = row.get(4)?;
        let created_at = parse_timestamp(&row.get::<_, String>(7)?);

        Ok(ContactLog {
            id: parse_uuid(&id)?,
            property_id: parse_uuid(&property_id)?,
            // A corrupt contact date falls back to when the log was written
            contact_date: parse_date(row.get(2)?).unwrap_or_else(|| created_at.date_naive()),
            contact_method: ContactMethod::parse(&method),
            outcome: ContactOutcome::parse(&outcome),
            notes: row.get(5)?,
            follow_up_date: parse_date(row.get(6)?),
            created_at,
        })
    }
}

impl ContactLogStore for Database {
    fn list_contact_logs(&self, property_id: Option<Uuid>) -> Result<Vec<ContactLog>> {
        let order = "ORDER BY contact_date DESC, created_at DESC";
        let logs = match property_id {
            Some(id) => {
                let sql = format!(
                    "SELECT {} FROM contact_logs WHERE property_id = ? {}",
                    LOG_COLUMNS, order
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([id.to_string()], Self::row_to_contact_log)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {} FROM contact_logs {}", LOG_COLUMNS, order);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], Self::row_to_contact_log)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(logs)
    }

    fn create_contact_log(&self, log: ContactLog) -> Result<ContactLog> {
        if self.get_property(log.property_id)?.is_none() {
            return Err(LeadError::PropertyNotFound(log.property_id));
        }
        self.insert_contact_log(&log)?;
        info!(log_id = %log.id, property_id = %log.property_id, "contact log created");
        Ok(log)
    }

    fn update_contact_log(&self, id: Uuid, patch: &ContactLogPatch) -> Result<ContactLog> {
        let current = self
            .get_contact_log(id)?
            .ok_or(LeadError::ContactLogNotFound(id))?;
        let updated = patch.apply_to(&current);
        self.conn.execute(
            "UPDATE contact_logs SET notes = ?, follow_up_date = ? WHERE id = ?",
            params![updated.notes, format_date(updated.follow_up_date), id.to_string()],
        )?;
        Ok(updated)
    }

    fn delete_contact_log(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM contact_logs WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl LeadStore for Database {
    /// The read and both writes run in one IMMEDIATE transaction, so the
    /// status is decided against the row as locked. Dropping the transaction
    /// on any error rolls back the log insert.
    fn commit_contact(&self, log: ContactLog, now: DateTime<Utc>) -> Result<(ContactLog, Property)> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let current = self
            .get_property(log.property_id)?
            .ok_or(LeadError::PropertyNotFound(log.property_id))?;
        let updated = PropertyPatch::for_contact(&current, log.contact_date).apply_to(&current, now)?;

        self.insert_contact_log(&log)?;
        self.write_property(&updated)?;
        tx.commit()?;

        info!(log_id = %log.id, property_id = %updated.id, status = updated.lead_status.as_str(), "contact committed");
        Ok((log, updated))
    }
}
