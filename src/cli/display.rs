use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::dates::format_relative;
use crate::leads::{days_on_market, lead_priority, DashboardStats, PriorityTier};
use crate::models::{ContactLog, Property};

const ADDRESS_WIDTH: usize = 28;
const CITY_WIDTH: usize = 14;
const OWNER_WIDTH: usize = 18;
const NOTES_WIDTH: usize = 60;

/// A property with its derived classification, as shown on lead lists.
#[derive(Debug, Serialize)]
pub struct LeadRow<'a> {
    #[serde(flatten)]
    pub property: &'a Property,
    pub days_on_market: Option<i64>,
    pub priority: Option<PriorityTier>,
}

impl<'a> LeadRow<'a> {
    pub fn new(property: &'a Property, now: DateTime<Utc>) -> Self {
        Self {
            property,
            days_on_market: days_on_market(property, now),
            priority: lead_priority(property, now),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First block of the UUID, enough to address a property from the CLI.
pub fn short_id(property: &Property) -> String {
    property.id.to_string().chars().take(8).collect()
}

/// "$450,000", or "-" when unknown.
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = price else {
        return "-".to_string();
    };
    let digits = format!("{:.0}", price.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

pub fn format_days(days: Option<i64>) -> String {
    match days {
        None => "?".to_string(),
        Some(1) => "1 day".to_string(),
        Some(d) => format!("{} days", d),
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to max_chars, adding ellipsis if needed.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// One line of the property list.
pub fn property_row(property: &Property) -> String {
    format!(
        "{}  {:<aw$}  {:<cw$}  {:>10}  {}",
        short_id(property),
        truncate(&property.address, ADDRESS_WIDTH),
        truncate(&property.city, CITY_WIDTH),
        format_price(property.price),
        property.lead_status.label(),
        aw = ADDRESS_WIDTH,
        cw = CITY_WIDTH,
    )
}

/// One line of a lead list: tier badge, time on market, owner contact.
pub fn lead_row(row: &LeadRow) -> String {
    let p = row.property;
    let badge = row.priority.map(|t| t.label()).unwrap_or("");
    let owner = if p.owner_name.trim().is_empty() {
        "(no owner)".to_string()
    } else {
        truncate(&p.owner_name, OWNER_WIDTH)
    };
    let mut line = format!(
        "{}  {:<8}  {:>8}  {:<aw$}  {:<ow$}",
        short_id(p),
        badge,
        format_days(row.days_on_market),
        truncate(&p.address, ADDRESS_WIDTH),
        owner,
        aw = ADDRESS_WIDTH,
        ow = OWNER_WIDTH,
    );
    if let Some(ref phone) = p.owner_phone {
        line.push_str("  ");
        line.push_str(phone);
    }
    line.trim_end().to_string()
}

pub fn print_stats(stats: &DashboardStats) {
    println!("  Properties       {}", stats.total_properties);
    println!("  Hot leads        {}", stats.hot_leads);
    println!("  Avg price        {}", format_price(Some(stats.avg_price)));
    println!("  Added this week  {}", stats.added_this_week);
    println!("  Contacted (mo)   {}", stats.contacted_this_month);
}

/// Print a property with every non-empty field.
pub fn print_property_detail(property: &Property, now: DateTime<Utc>) {
    let row = LeadRow::new(property, now);

    println!("{}\n", property.location());

    let mut facts = vec![
        property.property_type.label().to_string(),
        format_price(property.price),
    ];
    if let Some(beds) = property.bedrooms {
        facts.push(format!("{} bd", beds));
    }
    if let Some(baths) = property.bathrooms {
        facts.push(format!("{} ba", baths));
    }
    if let Some(sqft) = property.square_feet {
        facts.push(format!("{} sqft", sqft));
    }
    println!("  {}", facts.join(" · "));

    let listed = if property.is_still_listed { "listed" } else { "off market" };
    match row.priority {
        Some(tier) => println!(
            "  Posted {} ({} on market, {}) [{}]",
            format_date(property.posting_date),
            format_days(row.days_on_market),
            listed,
            tier
        ),
        None => println!(
            "  Posted {} ({} on market, {})",
            format_date(property.posting_date),
            format_days(row.days_on_market),
            listed
        ),
    }

    println!("  Status: {}", property.lead_status.label());
    if let Some(last) = property.last_contact_date {
        println!("  Last contact: {}", last.format("%Y-%m-%d"));
    }

    if !property.owner_name.trim().is_empty() {
        println!("\n  {}", property.owner_name);
    }
    if let Some(ref phone) = property.owner_phone {
        println!("  {}", phone);
    }
    if let Some(ref email) = property.owner_email {
        println!("  {}", email);
    }
    if let Some(ref url) = property.listing_url {
        println!("  {}", url);
    }
    if let Some(ref notes) = property.notes {
        if !notes.trim().is_empty() {
            println!("\n  {}", truncate(notes, NOTES_WIDTH));
        }
    }
    println!("\n  id: {}", property.id);
}

/// One contact history entry, with any follow-up relative to `today`.
pub fn contact_log_line(log: &ContactLog, today: NaiveDate) -> String {
    let mut line = format!(
        "{}  {:<12}  {}",
        log.contact_date.format("%Y-%m-%d"),
        log.contact_method.label(),
        log.outcome.label()
    );
    if let Some(follow_up) = log.follow_up_date {
        line.push_str(&format!("  (follow up {})", format_relative(follow_up, today)));
    }
    line
}

pub fn print_contact_history(logs: &[ContactLog], today: NaiveDate) {
    if logs.is_empty() {
        println!("\nNo contact history.");
        return;
    }
    println!("\nContact history ({})", logs.len());
    for log in logs {
        println!("  {}", contact_log_line(log, today));
        if let Some(ref notes) = log.notes {
            println!("    {}", truncate(notes, NOTES_WIDTH));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactMethod, ContactOutcome, LeadStatus};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(None), "-");
        assert_eq!(format_price(Some(0.0)), "$0");
        assert_eq!(format_price(Some(999.0)), "$999");
        assert_eq!(format_price(Some(1000.0)), "$1,000");
        assert_eq!(format_price(Some(450_000.0)), "$450,000");
        assert_eq!(format_price(Some(1_234_567.4)), "$1,234,567");
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_days(None), "?");
        assert_eq!(format_days(Some(1)), "1 day");
        assert_eq!(format_days(Some(35)), "35 days");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 8), "this is…");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn test_lead_row() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let mut p = Property::new("123 Main St");
        p.owner_name = "John Doe".to_string();
        p.owner_phone = Some("555-0100".to_string());
        p.posting_date = Some(date(2024, 2, 9));
        p.lead_status = LeadStatus::ReadyToContact;

        let row = LeadRow::new(&p, now);
        assert_eq!(row.days_on_market, Some(35));
        assert_eq!(row.priority, Some(PriorityTier::VeryHot));

        let line = lead_row(&row);
        assert!(line.starts_with(&short_id(&p)));
        assert!(line.contains("Very Hot"));
        assert!(line.contains("35 days"));
        assert!(line.ends_with("555-0100"));
    }

    #[test]
    fn test_lead_row_json_is_flat() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let p = Property::new("5 Cedar Ln");
        let value = serde_json::to_value(LeadRow::new(&p, now)).unwrap();
        assert_eq!(value["address"], "5 Cedar Ln");
        assert!(value["days_on_market"].is_null());
        assert!(value["priority"].is_null());
    }

    #[test]
    fn test_contact_log_line() {
        let mut log = ContactLog::new(
            uuid::Uuid::new_v4(),
            date(2024, 3, 14),
            ContactMethod::Phone,
            ContactOutcome::CallbackRequested,
        );
        assert_eq!(
            contact_log_line(&log, date(2024, 3, 15)),
            "2024-03-14  Phone Call    Callback Requested"
        );

        log.follow_up_date = Some(date(2024, 3, 16));
        assert!(contact_log_line(&log, date(2024, 3, 15)).ends_with("(follow up tomorrow)"));
    }
}
