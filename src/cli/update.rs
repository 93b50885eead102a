use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::debug;

use super::dates::parse_date;
use super::display::short_id;
use super::PropertyFields;
use crate::clock::Clock;
use crate::models::{LeadStatus, PropertyPatch, PropertyType};
use crate::store::{find_property, LeadStore};

/// Turn command-line field values into a patch.
///
/// Text fields are trimmed; an empty value clears an optional field.
pub fn build_patch(
    address: Option<&str>,
    fields: &PropertyFields,
    today: NaiveDate,
) -> Result<PropertyPatch> {
    let posting_date = match fields.posted.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(s) => Some(Some(parse_date(s, today)?)),
    };

    Ok(PropertyPatch {
        address: address.map(|a| a.trim().to_string()),
        city: fields.city.as_ref().map(|c| c.trim().to_string()),
        price: fields.price.map(Some),
        posting_date,
        property_type: fields
            .property_type
            .as_deref()
            .map(str::parse::<PropertyType>)
            .transpose()?,
        bedrooms: fields.beds.map(Some),
        bathrooms: fields.baths.map(Some),
        square_feet: fields.sqft.map(Some),
        is_still_listed: fields.listed,
        owner_name: fields.owner.as_ref().map(|o| o.trim().to_string()),
        owner_phone: optional_text(&fields.phone),
        owner_email: optional_text(&fields.email),
        lead_status: fields
            .status
            .as_deref()
            .map(str::parse::<LeadStatus>)
            .transpose()?,
        last_contact_date: None,
        notes: optional_text(&fields.notes),
        listing_url: optional_text(&fields.url),
    })
}

fn optional_text(value: &Option<String>) -> Option<Option<String>> {
    value.as_ref().map(|v| {
        let v = v.trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    })
}

/// Execute the update command
pub fn run_update(
    store: &dyn LeadStore,
    clock: &dyn Clock,
    identifier: &str,
    address: Option<&str>,
    fields: &PropertyFields,
) -> Result<()> {
    let property = find_property(store, identifier)?;
    let patch = build_patch(address, fields, clock.now().date_naive())?;
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --status ready_to_contact");
    }

    debug!(property_id = %property.id, "updating property");
    let updated = store.update_property(property.id, &patch, clock.now())?;
    println!("Saved {} ({}).", updated.location(), short_id(&updated));
    Ok(())
}
