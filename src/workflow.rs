//! Contact workflow
//!
//! The single mutation path for pipeline state: log an outreach attempt and
//! move the property to `contacted` in one commit.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{LeadError, Result};
use crate::models::{ContactLog, ContactMethod, ContactOutcome, Property};
use crate::store::LeadStore;

/// What the contact form collects. `outcome` stays optional here so an
/// unfinished form can be represented and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactAttempt {
    pub contact_date: NaiveDate,
    pub contact_method: ContactMethod,
    pub outcome: Option<ContactOutcome>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

impl ContactAttempt {
    pub fn new(contact_date: NaiveDate, contact_method: ContactMethod) -> Self {
        Self {
            contact_date,
            contact_method,
            outcome: None,
            notes: None,
            follow_up_date: None,
        }
    }

    pub fn with_outcome(mut self, outcome: ContactOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Returns the required outcome, or a validation error.
    pub fn validate(&self) -> Result<ContactOutcome> {
        let outcome = self
            .outcome
            .ok_or_else(|| LeadError::validation("contact outcome is required"))?;

        if let Some(follow_up) = self.follow_up_date {
            if follow_up < self.contact_date {
                return Err(LeadError::validation(format!(
                    "follow-up date {} is before contact date {}",
                    follow_up, self.contact_date
                )));
            }
        }

        Ok(outcome)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedContact {
    pub log: ContactLog,
    pub property: Property,
}

/// Append a contact log for `property` and mark it contacted.
///
/// Validation happens before any write. The log and the status change are
/// committed together through [`LeadStore::commit_contact`], which decides
/// the new status from the property as stored at that moment; `property` only
/// names the target.
pub fn record_contact(
    store: &dyn LeadStore,
    clock: &dyn Clock,
    property: &Property,
    attempt: ContactAttempt,
) -> Result<RecordedContact> {
    let outcome = attempt.validate()?;

    if outcome.expects_follow_up() && attempt.follow_up_date.is_none() {
        warn!(property_id = %property.id, outcome = outcome.as_str(), "contact recorded without a follow-up date");
    }

    let now = clock.now();
    let mut log = ContactLog::new(property.id, attempt.contact_date, attempt.contact_method, outcome);
    log.notes = attempt.notes.filter(|n| !n.trim().is_empty());
    log.follow_up_date = attempt.follow_up_date;
    log.created_at = now;

    let (log, property) = store.commit_contact(log, now)?;
    info!(
        property_id = %property.id,
        method = log.contact_method.as_str(),
        outcome = log.outcome.as_str(),
        "contact recorded"
    );
    Ok(RecordedContact { log, property })
}
