use anyhow::Result;
use tracing::debug;

use super::display::{print_json, property_row};
use crate::leads::search_properties;
use crate::models::{LeadStatus, Property};
use crate::store::{LeadStore, PropertySort};

/// Load, filter and sort properties for the list page.
pub fn load_properties(
    store: &dyn LeadStore,
    search: Option<&str>,
    status: Option<&str>,
    sort: &str,
) -> Result<Vec<Property>> {
    let sort: PropertySort = sort.parse()?;
    let status = status.map(str::parse::<LeadStatus>).transpose()?;

    let properties = store.list_properties(sort)?;
    let matched: Vec<Property> = search_properties(&properties, search.unwrap_or(""), status)
        .into_iter()
        .cloned()
        .collect();
    debug!(total = properties.len(), matched = matched.len(), "filtered property list");
    Ok(matched)
}

/// Execute the list command
pub fn run_list(
    store: &dyn LeadStore,
    search: Option<&str>,
    status: Option<&str>,
    sort: &str,
    json: bool,
) -> Result<()> {
    let properties = load_properties(store, search, status, sort)?;

    if json {
        return print_json(&properties);
    }

    if properties.is_empty() {
        if search.is_some() || status.is_some() {
            println!("No matches.");
        } else {
            println!("No properties yet. Add one with `leadtrack add --address ...`");
        }
        return Ok(());
    }

    for property in &properties {
        println!("{}", property_row(property));
    }
    println!("\n{} properties", properties.len());
    Ok(())
}
