use anyhow::Result;
use chrono::NaiveDate;

use super::dates::{format_relative, parse_date};
use super::display::short_id;
use super::ui::{select, warning};
use super::ContactArgs;
use crate::clock::Clock;
use crate::models::{ContactMethod, ContactOutcome};
use crate::store::{find_property, LeadStore};
use crate::workflow::{record_contact, ContactAttempt};

/// Build the attempt from command-line values. The outcome stays `None` when
/// not given so the caller can prompt for it.
pub fn build_attempt(args: &ContactArgs, today: NaiveDate) -> Result<ContactAttempt> {
    let contact_date = parse_date(&args.date, today)?;
    let contact_method: ContactMethod = args.method.parse()?;

    let mut attempt = ContactAttempt::new(contact_date, contact_method);
    attempt.outcome = args
        .outcome
        .as_deref()
        .map(str::parse::<ContactOutcome>)
        .transpose()?;
    attempt.notes = args.notes.clone();
    attempt.follow_up_date = args
        .follow_up
        .as_deref()
        .map(|s| parse_date(s, today))
        .transpose()?;
    Ok(attempt)
}

fn prompt_outcome() -> Result<Option<ContactOutcome>> {
    let labels: Vec<&str> = ContactOutcome::ALL.iter().map(|o| o.label()).collect();
    let choice = select("outcome:", &labels)?;
    Ok(choice.map(|idx| ContactOutcome::ALL[idx]))
}

/// Execute the contact command. With `interactive` set, a missing outcome
/// is asked for instead of rejected.
pub fn run_contact(
    store: &dyn LeadStore,
    clock: &dyn Clock,
    args: &ContactArgs,
    interactive: bool,
) -> Result<()> {
    let today = clock.now().date_naive();
    let property = find_property(store, &args.identifier)?;
    let mut attempt = build_attempt(args, today)?;

    if attempt.outcome.is_none() && interactive {
        println!("{} ({})", property.location(), short_id(&property));
        attempt.outcome = prompt_outcome()?;
        if attempt.outcome.is_none() {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let recorded = record_contact(store, clock, &property, attempt)?;

    println!(
        "Logged {} by {} for {}. Status: {}.",
        recorded.log.outcome.label(),
        recorded.log.contact_method.label().to_lowercase(),
        recorded.property.address,
        recorded.property.lead_status.label()
    );
    match recorded.log.follow_up_date {
        Some(date) => println!("Follow up {}.", format_relative(date, today)),
        None if recorded.log.outcome.expects_follow_up() => {
            warning("no follow-up date set; add one with --follow-up")
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::LeadError;
    use crate::models::{LeadStatus, Property};
    use crate::store::{ContactLogStore, MemoryStore, PropertyStore};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
    }

    fn args(identifier: &str) -> ContactArgs {
        ContactArgs {
            identifier: identifier.to_string(),
            date: "yesterday".to_string(),
            method: "email".to_string(),
            outcome: Some("interested".to_string()),
            notes: Some("Wants a valuation".to_string()),
            follow_up: Some("+1w".to_string()),
        }
    }

    #[test]
    fn test_build_attempt() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let attempt = build_attempt(&args("x"), today).unwrap();
        assert_eq!(attempt.contact_date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(attempt.contact_method, ContactMethod::Email);
        assert_eq!(attempt.outcome, Some(ContactOutcome::Interested));
        assert_eq!(attempt.follow_up_date, NaiveDate::from_ymd_opt(2024, 3, 22));
    }

    #[test]
    fn test_build_attempt_rejects_unknown_method() {
        let mut a = args("x");
        a.method = "carrier pigeon".to_string();
        assert!(build_attempt(&a, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).is_err());
    }

    #[test]
    fn test_run_contact() {
        let store = MemoryStore::new();
        let mut p = Property::new("123 Main St");
        p.owner_name = "John Doe".to_string();
        let p = store.create_property(p).unwrap();

        run_contact(&store, &clock(), &args(&p.id.to_string()), false).unwrap();

        let stored = store.get_property(p.id).unwrap().unwrap();
        assert_eq!(stored.lead_status, LeadStatus::Contacted);
        let logs = store.list_contact_logs(Some(p.id)).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].notes.as_deref(), Some("Wants a valuation"));
    }

    #[test]
    fn test_run_contact_without_outcome_is_rejected() {
        let store = MemoryStore::new();
        let p = store.create_property(Property::new("9 Elm St")).unwrap();

        let mut a = args(&p.id.to_string());
        a.outcome = None;
        let err = run_contact(&store, &clock(), &a, false).unwrap_err();
        assert!(matches!(err.downcast_ref::<LeadError>(), Some(LeadError::Validation(_))));
        assert!(store.list_contact_logs(None).unwrap().is_empty());
    }
}
