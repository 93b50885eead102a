use anyhow::{bail, Result};

use super::display::{format_price, short_id};
use super::ui::confirm;
use crate::store::{find_property, LeadStore};

/// Execute the delete command
pub fn run_delete(
    store: &dyn LeadStore,
    identifier: &str,
    force: bool,
    interactive: bool,
) -> Result<()> {
    let property = find_property(store, identifier)?;
    let history = store.list_contact_logs(Some(property.id))?.len();

    println!(
        "{} {} ({})",
        property.location(),
        format_price(property.price),
        short_id(&property)
    );
    if history > 0 {
        println!("  {} contact log(s) will also be removed", history);
    }

    if !force {
        if !interactive {
            bail!("Refusing to delete without confirmation. Pass --force.");
        }
        if !confirm(&format!("Delete {}?", property.address))? {
            return Ok(());
        }
    }

    if store.delete_property(property.id)? {
        println!("Deleted.");
    } else {
        println!("Already gone.");
    }
    Ok(())
}
