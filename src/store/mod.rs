//! Data-access contract
//!
//! The classification engine and contact workflow only see these traits.
//! `MemoryStore` is the seeded placeholder; `Database` is the SQLite backend.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::error::{LeadError, Result};
use crate::models::{ContactLog, ContactLogPatch, Property, PropertyPatch};

mod memory;

pub use memory::MemoryStore;

/// Column a property listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedDate,
    PostingDate,
    Price,
    Address,
}

impl SortField {
    pub fn to_sql_column(&self) -> &'static str {
        match self {
            Self::CreatedDate => "created_at",
            Self::PostingDate => "posting_date",
            Self::Price => "price",
            Self::Address => "address COLLATE NOCASE",
        }
    }
}

/// Listing order. Parsed from `-created_date` style keys, where a leading
/// `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySort {
    pub field: SortField,
    pub descending: bool,
}

impl PropertySort {
    pub const NEWEST_FIRST: PropertySort = PropertySort {
        field: SortField::CreatedDate,
        descending: true,
    };

    /// Most recently posted listings first.
    pub const LATEST_POSTED: PropertySort = PropertySort {
        field: SortField::PostingDate,
        descending: true,
    };

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ord = match self.field {
            SortField::CreatedDate => a.created_at.cmp(&b.created_at),
            SortField::PostingDate => a.posting_date.cmp(&b.posting_date),
            SortField::Price => a
                .price
                .unwrap_or(0.0)
                .total_cmp(&b.price.unwrap_or(0.0)),
            SortField::Address => a.address.to_lowercase().cmp(&b.address.to_lowercase()),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }

    pub fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}", self.field.to_sql_column(), direction)
    }
}

impl Default for PropertySort {
    fn default() -> Self {
        Self::NEWEST_FIRST
    }
}

impl FromStr for PropertySort {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (descending, key) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = match key.to_lowercase().as_str() {
            "created_date" | "created_at" | "created" => SortField::CreatedDate,
            "posting_date" | "posted" => SortField::PostingDate,
            "price" => SortField::Price,
            "address" => SortField::Address,
            _ => return Err(LeadError::validation(format!("unknown sort key: {}", s))),
        };
        Ok(Self { field, descending })
    }
}

pub trait PropertyStore {
    fn list_properties(&self, sort: PropertySort) -> Result<Vec<Property>>;

    fn get_property(&self, id: Uuid) -> Result<Option<Property>>;

    /// Validate and store a new property, returning the stored record.
    fn create_property(&self, property: Property) -> Result<Property>;

    /// Apply `patch` to the stored property, stamping `updated_at` with
    /// `now`, and return the updated record.
    fn update_property(&self, id: Uuid, patch: &PropertyPatch, now: DateTime<Utc>) -> Result<Property>;

    fn delete_property(&self, id: Uuid) -> Result<bool>;
}

pub trait ContactLogStore {
    /// All logs, or only those for `property_id`. Newest contact first.
    fn list_contact_logs(&self, property_id: Option<Uuid>) -> Result<Vec<ContactLog>>;

    fn create_contact_log(&self, log: ContactLog) -> Result<ContactLog>;

    fn update_contact_log(&self, id: Uuid, patch: &ContactLogPatch) -> Result<ContactLog>;

    fn delete_contact_log(&self, id: Uuid) -> Result<bool>;
}

/// Both halves of the contract plus the one multi-entity write.
pub trait LeadStore: PropertyStore + ContactLogStore {
    /// Append `log` and move its property through [`PropertyPatch::for_contact`],
    /// all or nothing. The status change is derived from the property as read
    /// at commit time, so a terminal status set by another writer survives.
    ///
    /// The default runs the writes in sequence and deletes the log again if
    /// the property update fails. It reads the property as late as it can but
    /// holds no lock; stores with real transactions override it.
    fn commit_contact(&self, log: ContactLog, now: DateTime<Utc>) -> Result<(ContactLog, Property)> {
        let property_id = log.property_id;
        let log = self.create_contact_log(log)?;

        let updated = self
            .get_property(property_id)
            .and_then(|current| current.ok_or(LeadError::PropertyNotFound(property_id)))
            .and_then(|current| {
                let patch = PropertyPatch::for_contact(&current, log.contact_date);
                self.update_property(property_id, &patch, now)
            });

        match updated {
            Ok(property) => Ok((log, property)),
            Err(err) => {
                warn!(log_id = %log.id, %property_id, error = %err, "property update failed, removing contact log");
                if let Err(undo) = self.delete_contact_log(log.id) {
                    warn!(log_id = %log.id, error = %undo, "could not remove orphaned contact log");
                }
                Err(err)
            }
        }
    }
}

/// Find a property by full UUID or unique id prefix.
pub fn find_property(store: &dyn LeadStore, identifier: &str) -> Result<Property> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(LeadError::validation("property id is required"));
    }

    if let Ok(id) = Uuid::parse_str(identifier) {
        return store.get_property(id)?.ok_or(LeadError::PropertyNotFound(id));
    }

    let prefix = identifier.to_lowercase();
    let mut matches: Vec<Property> = store
        .list_properties(PropertySort::default())?
        .into_iter()
        .filter(|p| p.id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(LeadError::validation(format!("no property matches '{}'", identifier))),
        1 => Ok(matches.remove(0)),
        n => Err(LeadError::validation(format!(
            "'{}' matches {} properties, use a longer id",
            identifier, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_sort_parse() {
        let sort: PropertySort = "-created_date".parse().unwrap();
        assert_eq!(sort, PropertySort::NEWEST_FIRST);

        let sort: PropertySort = "posting_date".parse().unwrap();
        assert_eq!(sort.field, SortField::PostingDate);
        assert!(!sort.descending);
        assert_eq!("-posting_date".parse::<PropertySort>().unwrap(), PropertySort::LATEST_POSTED);

        assert!("-bogus".parse::<PropertySort>().is_err());
    }

    #[test]
    fn test_sort_to_sql() {
        assert_eq!(PropertySort::NEWEST_FIRST.to_sql(), "created_at DESC");
        let sort: PropertySort = "price".parse().unwrap();
        assert_eq!(sort.to_sql(), "price ASC");
    }

    #[test]
    fn test_sort_compare() {
        let mut a = Property::new("A St");
        a.price = Some(100.0);
        a.posting_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let mut b = Property::new("b St");
        b.price = None;
        b.posting_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        b.created_at = a.created_at + Duration::seconds(5);

        let mut props = vec![a.clone(), b.clone()];
        props.sort_by(|x, y| "-price".parse::<PropertySort>().unwrap().compare(x, y));
        assert_eq!(props[0].id, a.id);

        props.sort_by(|x, y| PropertySort::NEWEST_FIRST.compare(x, y));
        assert_eq!(props[0].id, b.id);

        props.sort_by(|x, y| "address".parse::<PropertySort>().unwrap().compare(x, y));
        assert_eq!(props[0].id, a.id);
    }

    #[test]
    fn test_find_property_by_prefix() {
        let store = MemoryStore::new();
        let p = store.create_property(Property::new("1 Elm St")).unwrap();

        let full = find_property(&store, &p.id.to_string()).unwrap();
        assert_eq!(full.id, p.id);

        let prefix = &p.id.to_string()[..8];
        let found = find_property(&store, prefix).unwrap();
        assert_eq!(found.id, p.id);

        assert!(find_property(&store, "").is_err());
        assert!(matches!(
            find_property(&store, &Uuid::new_v4().to_string()),
            Err(LeadError::PropertyNotFound(_))
        ));
    }
}
