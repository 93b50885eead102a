use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::display::{lead_row, print_json, print_stats, property_row, LeadRow};
use crate::clock::Clock;
use crate::leads::{aggregate_stats, hot_leads_by_urgency, recent_properties, DashboardStats};
use crate::models::{ContactLog, Property};
use crate::store::{LeadStore, PropertySort};

const URGENT_LIMIT: usize = 3;
const RECENT_LIMIT: usize = 4;

#[derive(Debug, Serialize)]
pub struct Dashboard<'a> {
    pub stats: DashboardStats,
    pub urgent: Vec<LeadRow<'a>>,
    pub recent: Vec<&'a Property>,
}

pub fn build_dashboard<'a>(
    properties: &'a [Property],
    contact_logs: &[ContactLog],
    now: DateTime<Utc>,
) -> Dashboard<'a> {
    Dashboard {
        stats: aggregate_stats(properties, contact_logs, now),
        urgent: hot_leads_by_urgency(properties, now, URGENT_LIMIT)
            .into_iter()
            .map(|p| LeadRow::new(p, now))
            .collect(),
        recent: recent_properties(properties, RECENT_LIMIT),
    }
}

/// Execute the dashboard command
pub fn run_dashboard(store: &dyn LeadStore, clock: &dyn Clock, json: bool) -> Result<()> {
    let now = clock.now();
    let properties = store.list_properties(PropertySort::NEWEST_FIRST)?;
    let logs = store.list_contact_logs(None)?;
    let dashboard = build_dashboard(&properties, &logs, now);

    if json {
        return print_json(&dashboard);
    }

    print_stats(&dashboard.stats);

    println!("\nMost urgent");
    if dashboard.urgent.is_empty() {
        println!("  No hot leads.");
    }
    for row in &dashboard.urgent {
        println!("  {}", lead_row(row));
    }

    println!("\nRecently added");
    if dashboard.recent.is_empty() {
        println!("  No properties yet.");
    }
    for property in &dashboard.recent {
        println!("  {}", property_row(property));
    }
    Ok(())
}
