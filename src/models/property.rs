use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LeadError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    ReadyToContact,
    Contacted,
    Interested,
    NotInterested,
    Converted,
    SoldElsewhere,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        Self::New,
        Self::ReadyToContact,
        Self::Contacted,
        Self::Interested,
        Self::NotInterested,
        Self::Converted,
        Self::SoldElsewhere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::ReadyToContact => "ready_to_contact",
            Self::Contacted => "contacted",
            Self::Interested => "interested",
            Self::NotInterested => "not_interested",
            Self::Converted => "converted",
            Self::SoldElsewhere => "sold_elsewhere",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::ReadyToContact => "Ready to Contact",
            Self::Contacted => "Contacted",
            Self::Interested => "Interested",
            Self::NotInterested => "Not Interested",
            Self::Converted => "Converted",
            Self::SoldElsewhere => "Sold Elsewhere",
        }
    }

    /// Lenient parse for stored values. Unknown strings fall back to `New`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// No further outreach is expected once a lead reaches one of these.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotInterested | Self::Converted | Self::SoldElsewhere
        )
    }

    /// Status after a contact attempt. Terminal leads stay terminal.
    pub fn after_contact(self) -> Self {
        if self.is_terminal() {
            self
        } else {
            Self::Contacted
        }
    }
}

impl FromStr for LeadStatus {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| LeadError::validation(format!("unknown lead status: {}", s)))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    House,
    Condo,
    Townhouse,
    Duplex,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        Self::House,
        Self::Condo,
        Self::Townhouse,
        Self::Duplex,
        Self::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Condo => "condo",
            Self::Townhouse => "townhouse",
            Self::Duplex => "duplex",
            Self::Land => "land",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Condo => "Condo",
            Self::Townhouse => "Townhouse",
            Self::Duplex => "Duplex",
            Self::Land => "Land",
        }
    }

    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for PropertyType {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| LeadError::validation(format!("unknown property type: {}", s)))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scraped or manually entered listing and the state of outreach to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    pub city: String,
    pub price: Option<f64>,
    /// `None` when the listing date is unknown or could not be parsed.
    pub posting_date: Option<NaiveDate>,
    pub property_type: PropertyType,
    pub bedrooms: Option<f32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub is_still_listed: bool,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub owner_email: Option<String>,
    pub lead_status: LeadStatus,
    /// Only the contact workflow writes this.
    pub last_contact_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub listing_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            city: String::new(),
            price: None,
            posting_date: None,
            property_type: PropertyType::default(),
            bedrooms: None,
            bathrooms: None,
            square_feet: None,
            is_still_listed: true,
            owner_name: String::new(),
            owner_phone: None,
            owner_email: None,
            lead_status: LeadStatus::default(),
            last_contact_date: None,
            notes: None,
            listing_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A lead is only actionable when we know who owns the place.
    pub fn is_usable_lead(&self) -> bool {
        !self.owner_name.trim().is_empty()
    }

    /// Check the fields a store must never accept.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(LeadError::validation("address is required"));
        }
        if self.price.is_some_and(|p| p.is_nan() || p < 0.0) {
            return Err(LeadError::validation("price cannot be negative"));
        }
        if self.bedrooms.is_some_and(|b| b.is_nan() || b < 0.0) {
            return Err(LeadError::validation("bedrooms cannot be negative"));
        }
        if self.bathrooms.is_some_and(|b| b.is_nan() || b < 0.0) {
            return Err(LeadError::validation("bathrooms cannot be negative"));
        }
        Ok(())
    }

    /// "address, city" for one-line display.
    pub fn location(&self) -> String {
        if self.city.trim().is_empty() {
            self.address.clone()
        } else {
            format!("{}, {}", self.address, self.city)
        }
    }
}

/// Field edits from the property form. `None` leaves a field unchanged;
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub address: Option<String>,
    pub city: Option<String>,
    pub price: Option<Option<f64>>,
    pub posting_date: Option<Option<NaiveDate>>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<Option<f32>>,
    pub bathrooms: Option<Option<f32>>,
    pub square_feet: Option<Option<u32>>,
    pub is_still_listed: Option<bool>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<Option<String>>,
    pub owner_email: Option<Option<String>>,
    pub lead_status: Option<LeadStatus>,
    pub last_contact_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub listing_url: Option<Option<String>>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The pipeline change a contact on `contact_date` makes to `current`.
    /// Build it from the row read inside the commit, never from a cached copy.
    pub fn for_contact(current: &Property, contact_date: NaiveDate) -> Self {
        Self {
            lead_status: Some(current.lead_status.after_contact()),
            last_contact_date: Some(Some(contact_date)),
            ..Default::default()
        }
    }

    /// Apply to a copy of `property`, validating the result.
    pub fn apply_to(&self, property: &Property, now: DateTime<Utc>) -> Result<Property> {
        let mut updated = property.clone();

        if let Some(ref v) = self.address {
            updated.address = v.clone();
        }
        if let Some(ref v) = self.city {
            updated.city = v.clone();
        }
        if let Some(v) = self.price {
            updated.price = v;
        }
        if let Some(v) = self.posting_date {
            updated.posting_date = v;
        }
        if let Some(v) = self.property_type {
            updated.property_type = v;
        }
        if let Some(v) = self.bedrooms {
            updated.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            updated.bathrooms = v;
        }
        if let Some(v) = self.square_feet {
            updated.square_feet = v;
        }
        if let Some(v) = self.is_still_listed {
            updated.is_still_listed = v;
        }
        if let Some(ref v) = self.owner_name {
            updated.owner_name = v.clone();
        }
        if let Some(ref v) = self.owner_phone {
            updated.owner_phone = v.clone();
        }
        if let Some(ref v) = self.owner_email {
            updated.owner_email = v.clone();
        }
        if let Some(v) = self.lead_status {
            updated.lead_status = v;
        }
        if let Some(v) = self.last_contact_date {
            updated.last_contact_date = v;
        }
        if let Some(ref v) = self.notes {
            updated.notes = v.clone();
        }
        if let Some(ref v) = self.listing_url {
            updated.listing_url = v.clone();
        }

        updated.validate()?;
        updated.updated_at = now;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_new_defaults() {
        let p = Property::new("123 Main St");
        assert_eq!(p.lead_status, LeadStatus::New);
        assert_eq!(p.property_type, PropertyType::House);
        assert!(p.is_still_listed);
        assert!(p.posting_date.is_none());
        assert!(!p.is_usable_lead());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("ready_to_contact".parse::<LeadStatus>().unwrap(), LeadStatus::ReadyToContact);
        assert_eq!("Sold Elsewhere".parse::<LeadStatus>().unwrap(), LeadStatus::SoldElsewhere);
        assert_eq!("not-interested".parse::<LeadStatus>().unwrap(), LeadStatus::NotInterested);
        assert!("lost".parse::<LeadStatus>().is_err());
        assert_eq!(LeadStatus::parse("lost"), LeadStatus::New);
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = LeadStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(
            terminal,
            vec![LeadStatus::NotInterested, LeadStatus::Converted, LeadStatus::SoldElsewhere]
        );
    }

    #[test]
    fn test_contact_patch_keeps_terminal_status() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let mut p = Property::new("123 Main St");

        p.lead_status = LeadStatus::Interested;
        let patch = PropertyPatch::for_contact(&p, day);
        assert_eq!(patch.lead_status, Some(LeadStatus::Contacted));
        assert_eq!(patch.last_contact_date, Some(Some(day)));

        p.lead_status = LeadStatus::SoldElsewhere;
        let patch = PropertyPatch::for_contact(&p, day);
        assert_eq!(patch.lead_status, Some(LeadStatus::SoldElsewhere));
        assert_eq!(patch.last_contact_date, Some(Some(day)));
    }

    #[test]
    fn test_property_type_parse() {
        assert_eq!("Condo".parse::<PropertyType>().unwrap(), PropertyType::Condo);
        assert!("castle".parse::<PropertyType>().is_err());
        assert_eq!(PropertyType::parse("castle"), PropertyType::House);
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut p = Property::new("1 Elm St");
        p.price = Some(-1.0);
        assert!(p.validate().is_err());

        p.price = Some(0.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_address() {
        let p = Property::new("   ");
        assert!(matches!(p.validate(), Err(LeadError::Validation(_))));
    }

    #[test]
    fn test_patch_applies_and_clears() {
        let mut p = Property::new("1 Elm St");
        p.notes = Some("call after 5".to_string());
        p.price = Some(300_000.0);

        let patch = PropertyPatch {
            city: Some("Anytown".to_string()),
            notes: Some(None),
            lead_status: Some(LeadStatus::Interested),
            ..Default::default()
        };
        let now = Utc::now();
        let updated = patch.apply_to(&p, now).unwrap();

        assert_eq!(updated.city, "Anytown");
        assert!(updated.notes.is_none());
        assert_eq!(updated.price, Some(300_000.0));
        assert_eq!(updated.lead_status, LeadStatus::Interested);
        assert_eq!(updated.updated_at, now);
        assert_eq!(updated.id, p.id);
    }

    #[test]
    fn test_patch_validates_result() {
        let p = Property::new("1 Elm St");
        let patch = PropertyPatch {
            address: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.apply_to(&p, Utc::now()).is_err());
    }

    #[test]
    fn test_location() {
        let mut p = Property::new("123 Main St");
        assert_eq!(p.location(), "123 Main St");
        p.city = "Anytown".to_string();
        assert_eq!(p.location(), "123 Main St, Anytown");
    }
}
