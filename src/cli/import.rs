use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::models::{LeadStatus, Property, PropertyType};
use crate::store::{LeadStore, PropertySort};

/// A row from a CSV import file.
///
/// Headers must match field names exactly (`owner_name`, not `Owner Name`).
/// Empty strings are converted to `None` for optional fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    /// Street address (required)
    pub address: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub city: Option<String>,

    /// Asking price; `$` and `,` are ignored
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub price: Option<String>,

    /// YYYY-MM-DD
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub posting_date: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub property_type: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bedrooms: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bathrooms: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub square_feet: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub owner_name: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub owner_phone: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub owner_email: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub listing_url: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lead_status: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,

    /// true/false, yes/no or 1/0; defaults to listed
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_still_listed: Option<String>,
}

impl ImportRow {
    /// Validate that required fields are present and non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            bail!("address is required and cannot be empty");
        }
        Ok(())
    }

    /// Build the property this row describes, stamped with `now`.
    pub fn to_property(&self, now: DateTime<Utc>) -> Result<Property> {
        self.validate()?;

        let mut property = Property::new(self.address.trim());
        property.city = self.city.clone().unwrap_or_default();
        property.price = parse_number(self.price.as_deref(), "price")?;
        property.posting_date = self
            .posting_date
            .as_deref()
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|_| anyhow!("posting_date must be YYYY-MM-DD, got '{}'", s))
            })
            .transpose()?;
        if let Some(ref t) = self.property_type {
            property.property_type = t.parse::<PropertyType>()?;
        }
        property.bedrooms = parse_number(self.bedrooms.as_deref(), "bedrooms")?;
        property.bathrooms = parse_number(self.bathrooms.as_deref(), "bathrooms")?;
        property.square_feet = parse_number(self.square_feet.as_deref(), "square_feet")?;
        property.owner_name = self.owner_name.clone().unwrap_or_default();
        property.owner_phone = self.owner_phone.clone();
        property.owner_email = self.owner_email.clone();
        property.listing_url = self.listing_url.clone();
        if let Some(ref s) = self.lead_status {
            property.lead_status = s.parse::<LeadStatus>()?;
        }
        property.notes = self.notes.clone();
        if let Some(ref s) = self.is_still_listed {
            property.is_still_listed = parse_bool(s)?;
        }
        property.created_at = now;
        property.updated_at = now;

        property.validate()?;
        Ok(property)
    }

    /// Case-insensitive address and city, for duplicate detection.
    fn dedup_key(&self) -> (String, String) {
        dedup_key(&self.address, self.city.as_deref().unwrap_or(""))
    }
}

fn dedup_key(address: &str, city: &str) -> (String, String) {
    (address.trim().to_lowercase(), city.trim().to_lowercase())
}

/// Deserialize empty strings as None.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>, field: &str) -> Result<Option<T>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    cleaned
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| anyhow!("{} is not a number: '{}'", field, raw))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => bail!("is_still_listed must be true or false, got '{}'", s),
    }
}

/// Import results summary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub properties: u32,
    pub hot_ready: u32,
    pub without_owner: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// Import every row from `reader`. Invalid rows are reported on stderr and
/// counted; the rest are created unless `dry_run` is set.
pub fn import_csv<R: Read>(
    store: &dyn LeadStore,
    reader: R,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<ImportStats> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut stats = ImportStats::default();

    let mut seen: HashSet<(String, String)> = store
        .list_properties(PropertySort::default())?
        .iter()
        .map(|p| dedup_key(&p.address, &p.city))
        .collect();

    for (idx, result) in csv_reader.deserialize::<ImportRow>().enumerate() {
        let line = idx + 2; // CSV line number (1-indexed, skip header)

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Line {}: parse error: {}", line, e);
                stats.errors += 1;
                continue;
            }
        };

        let property = match row.to_property(now) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Line {}: validation error: {}", line, e);
                stats.errors += 1;
                continue;
            }
        };

        if !seen.insert(row.dedup_key()) {
            debug!(line, address = %property.address, "skipping duplicate row");
            stats.duplicates += 1;
            continue;
        }

        if !dry_run {
            if let Err(e) = store.create_property(property.clone()) {
                eprintln!("Line {}: {}", line, e);
                stats.errors += 1;
                continue;
            }
        }

        stats.properties += 1;
        if crate::leads::is_hot_lead(&property, now) {
            stats.hot_ready += 1;
        }
        if !property.is_usable_lead() {
            stats.without_owner += 1;
        }
    }

    info!(
        created = stats.properties,
        duplicates = stats.duplicates,
        errors = stats.errors,
        dry_run,
        "import finished"
    );
    Ok(stats)
}

/// Execute the import command.
pub fn run_import(store: &dyn LeadStore, clock: &dyn Clock, file: &Path, dry_run: bool) -> Result<()> {
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }
    let reader = File::open(file).context("Failed to open CSV file")?;

    if dry_run {
        eprintln!("Dry run: {}", file.display());
    } else {
        eprintln!("Importing: {}", file.display());
    }

    let stats = import_csv(store, reader, dry_run, clock.now())?;
    print_summary(&stats, dry_run);
    Ok(())
}

fn print_summary(stats: &ImportStats, dry_run: bool) {
    let verb = if dry_run { "Would create" } else { "Created" };
    println!("\n{} {} properties", verb, stats.properties);

    if stats.hot_ready > 0 {
        println!("  {} already hot leads", stats.hot_ready);
    }
    if stats.without_owner > 0 {
        println!("  {} without an owner name", stats.without_owner);
    }
    if stats.duplicates > 0 {
        println!("Skipped {} duplicates", stats.duplicates);
    }
    if stats.errors > 0 {
        println!("Errors: {}", stats.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PropertyStore};
    use chrono::TimeZone;
    use std::io::Write;

    const HEADER: &str = "address,city,price,posting_date,property_type,bedrooms,bathrooms,square_feet,owner_name,owner_phone,owner_email,listing_url,lead_status,notes,is_still_listed";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn parse_row(line: &str) -> ImportRow {
        let data = format!("{}\n{}", HEADER, line);
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        reader.deserialize().next().unwrap().unwrap()
    }

    #[test]
    fn parse_complete_row() {
        let row = parse_row(
            "123 Main St,Anytown,\"$450,000\",2024-02-09,house,3,2.5,1800,John Doe,(555) 123-4567,john@example.com,https://example.com/1,ready_to_contact,Motivated,yes",
        );
        let p = row.to_property(now()).unwrap();

        assert_eq!(p.address, "123 Main St");
        assert_eq!(p.city, "Anytown");
        assert_eq!(p.price, Some(450_000.0));
        assert_eq!(p.posting_date, NaiveDate::from_ymd_opt(2024, 2, 9));
        assert_eq!(p.property_type, PropertyType::House);
        assert_eq!(p.bedrooms, Some(3.0));
        assert_eq!(p.bathrooms, Some(2.5));
        assert_eq!(p.square_feet, Some(1800));
        assert_eq!(p.owner_phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(p.lead_status, LeadStatus::ReadyToContact);
        assert!(p.is_still_listed);
        assert_eq!(p.created_at, now());
    }

    #[test]
    fn parse_minimal_row() {
        let row = parse_row("9 Elm St,,,,,,,,,,,,,,");
        assert!(row.city.is_none());
        assert!(row.price.is_none());
        assert!(row.is_still_listed.is_none());

        let p = row.to_property(now()).unwrap();
        assert_eq!(p.lead_status, LeadStatus::New);
        assert_eq!(p.property_type, PropertyType::House);
        assert!(p.posting_date.is_none());
        assert!(p.is_still_listed);
    }

    #[test]
    fn empty_strings_become_none() {
        let row = parse_row("9 Elm St,   ,  ,,,,,,,,,,,,");
        assert!(row.city.is_none());
        assert!(row.price.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_row(" ,Anytown,,,,,,,,,,,,,").to_property(now()).is_err());
        assert!(parse_row("9 Elm St,,cheap,,,,,,,,,,,,").to_property(now()).is_err());
        assert!(parse_row("9 Elm St,,,02/09/2024,,,,,,,,,,,").to_property(now()).is_err());
        assert!(parse_row("9 Elm St,,,,castle,,,,,,,,,,").to_property(now()).is_err());
        assert!(parse_row("9 Elm St,,-5,,,,,,,,,,,,").to_property(now()).is_err());
        assert!(parse_row("9 Elm St,,,,,,,,,,,,,,maybe").to_property(now()).is_err());
    }

    #[test]
    fn import_counts_and_skips() {
        let store = MemoryStore::new();
        let data = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            HEADER,
            "123 Main St,Anytown,450000,2024-02-09,,,,,John Doe,,,,,,",
            "5 Cedar Ln,Lakeside,612000,2024-03-12,duplex,,,,,,,,,,",
            "123 MAIN ST,anytown,1,,,,,,,,,,,,",
            "7 Bad Row,,not-a-price,,,,,,,,,,,,",
        );

        let stats = import_csv(&store, data.as_bytes(), false, now()).unwrap();
        assert_eq!(
            stats,
            ImportStats {
                properties: 2,
                hot_ready: 1,
                without_owner: 1,
                duplicates: 1,
                errors: 1,
            }
        );
        assert_eq!(store.list_properties(PropertySort::default()).unwrap().len(), 2);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let store = MemoryStore::new();
        let data = format!("{}\n9 Elm St,,,,,,,,,,,,,,\n", HEADER);
        let stats = import_csv(&store, data.as_bytes(), true, now()).unwrap();
        assert_eq!(stats.properties, 1);
        assert!(store.list_properties(PropertySort::default()).unwrap().is_empty());
    }

    #[test]
    fn run_import_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "9 Elm St,Ridgeview,210000,,,,,,,,,,,,").unwrap();

        let store = MemoryStore::new();
        run_import(&store, &crate::clock::FixedClock(now()), file.path(), false).unwrap();
        assert_eq!(store.list_properties(PropertySort::default()).unwrap().len(), 1);

        assert!(run_import(&store, &crate::clock::SystemClock, Path::new("/no/such/file.csv"), false).is_err());
    }
}
