use anyhow::Result;
use serde::Serialize;

use super::display::{print_contact_history, print_json, print_property_detail, LeadRow};
use crate::clock::Clock;
use crate::models::ContactLog;
use crate::store::{find_property, LeadStore};

#[derive(Serialize)]
struct PropertyView<'a> {
    #[serde(flatten)]
    lead: LeadRow<'a>,
    contact_logs: &'a [ContactLog],
}

/// Execute the show command
pub fn run_show(store: &dyn LeadStore, clock: &dyn Clock, identifier: &str, json: bool) -> Result<()> {
    let now = clock.now();
    let property = find_property(store, identifier)?;
    let logs = store.list_contact_logs(Some(property.id))?;

    if json {
        return print_json(&PropertyView {
            lead: LeadRow::new(&property, now),
            contact_logs: &logs,
        });
    }

    print_property_detail(&property, now);
    print_contact_history(&logs, now.date_naive());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::LeadError;
    use crate::store::{MemoryStore, PropertySort, PropertyStore};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_run_show_by_prefix() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let store = MemoryStore::with_sample_data(now);
        let oak = store
            .list_properties(PropertySort::default())
            .unwrap()
            .into_iter()
            .find(|p| p.address == "456 Oak Ave")
            .unwrap();

        let prefix: String = oak.id.to_string().chars().take(8).collect();
        run_show(&store, &FixedClock(now), &prefix, false).unwrap();
        run_show(&store, &FixedClock(now), &oak.id.to_string(), true).unwrap();
    }

    #[test]
    fn test_run_show_unknown_id() {
        let store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        let err = run_show(&store, &crate::clock::SystemClock, &id.to_string(), false).unwrap_err();
        assert!(matches!(err.downcast_ref::<LeadError>(), Some(LeadError::PropertyNotFound(_))));
    }
}
