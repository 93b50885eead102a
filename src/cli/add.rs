use anyhow::{bail, Result};

use super::display::{format_price, short_id};
use super::update::build_patch;
use super::PropertyFields;
use crate::clock::Clock;
use crate::leads::is_hot_lead;
use crate::models::Property;
use crate::store::LeadStore;

/// Execute the add command
pub fn run_add(
    store: &dyn LeadStore,
    clock: &dyn Clock,
    address: &str,
    fields: &PropertyFields,
) -> Result<()> {
    let address = address.trim();
    if address.is_empty() {
        bail!("Address is required.");
    }

    let now = clock.now();
    let patch = build_patch(None, fields, now.date_naive())?;

    let mut draft = Property::new(address);
    draft.created_at = now;
    let property = store.create_property(patch.apply_to(&draft, now)?)?;

    println!(
        "Added {} {} ({}).",
        property.location(),
        format_price(property.price),
        short_id(&property)
    );
    if is_hot_lead(&property, now) {
        println!("Already a hot lead.");
    } else if !property.is_usable_lead() {
        println!("No owner name yet; it won't show as a lead until one is added.");
    }
    Ok(())
}
