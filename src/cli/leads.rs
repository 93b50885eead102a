use anyhow::Result;
use serde::Serialize;

use chrono::{DateTime, Utc};

use super::display::{lead_row, print_json, LeadRow};
use crate::clock::Clock;
use crate::leads::{filter_by_tab, tab_counts, LeadTab, TabCounts};
use crate::models::Property;
use crate::store::{LeadStore, PropertySort};

#[derive(Serialize)]
struct LeadsView<'a> {
    tab: &'static str,
    counts: TabCounts,
    leads: Vec<LeadRow<'a>>,
}

fn tab_header(counts: &TabCounts, active: LeadTab) -> String {
    let tabs = [
        (LeadTab::All, "All", counts.all),
        (LeadTab::Hot, "Very Hot", counts.very_hot),
        (LeadTab::Warm, "Warm", counts.warm),
        (LeadTab::Contacted, "Contacted", counts.contacted),
    ]
    .iter()
    .map(|(tab, label, count)| {
        if *tab == active {
            format!("[{} ({})]", label, count)
        } else {
            format!("{} ({})", label, count)
        }
    })
    .collect::<Vec<_>>()
    .join("  ");
    format!("{}  |  Interested ({})", tabs, counts.interested)
}

fn empty_message(tab: LeadTab) -> &'static str {
    match tab {
        LeadTab::All => "No hot leads. Listings become leads after 14 days on market.",
        LeadTab::Hot => "No listings at 30+ days right now.",
        LeadTab::Warm => "No listings in the 14-20 day range.",
        LeadTab::Contacted => "Nobody contacted yet.",
    }
}

/// Header counts plus the properties under `tab`, latest posting first.
fn load_leads(
    store: &dyn LeadStore,
    tab: LeadTab,
    now: DateTime<Utc>,
) -> Result<(TabCounts, Vec<Property>)> {
    let properties = store.list_properties(PropertySort::LATEST_POSTED)?;
    let counts = tab_counts(&properties, now);
    let leads = filter_by_tab(&properties, tab, now)
        .into_iter()
        .cloned()
        .collect();
    Ok((counts, leads))
}

/// Execute the leads command
pub fn run_leads(store: &dyn LeadStore, clock: &dyn Clock, tab: &str, json: bool) -> Result<()> {
    let tab: LeadTab = tab.parse()?;
    let now = clock.now();
    let (counts, properties) = load_leads(store, tab, now)?;
    let leads: Vec<LeadRow> = properties.iter().map(|p| LeadRow::new(p, now)).collect();

    if json {
        return print_json(&LeadsView {
            tab: tab.as_str(),
            counts,
            leads,
        });
    }

    println!("{}\n", tab_header(&counts, tab));
    if leads.is_empty() {
        println!("{}", empty_message(tab));
        return Ok(());
    }
    for row in &leads {
        println!("{}", lead_row(row));
    }
    Ok(())
}
