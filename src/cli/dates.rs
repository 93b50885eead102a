use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};

/// Parse a date string relative to `today`.
/// Supports: "today", "yesterday", "tomorrow", "+Nd"/"-Nd" (days),
/// "+Nw"/"-Nw" (weeks), YYYY-MM-DD
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim().to_lowercase();

    let date = match s.as_str() {
        "today" => today,
        "yesterday" => today.pred_opt().context("Date out of range")?,
        "tomorrow" => today.succ_opt().context("Date out of range")?,
        _ if s.starts_with('+') => {
            let offset = parse_relative(&s[1..])?;
            today
                .checked_add_signed(offset)
                .with_context(|| format!("Date out of range: {}", s))?
        }
        _ if s.starts_with('-') => {
            let offset = parse_relative(&s[1..])?;
            today
                .checked_sub_signed(offset)
                .with_context(|| format!("Date out of range: {}", s))?
        }
        _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            anyhow::anyhow!("Invalid date. Use: today, tomorrow, +3d, -1w, or YYYY-MM-DD")
        })?,
    };

    Ok(date)
}

/// Parse relative date suffix like "3d" or "2w" into an offset.
fn parse_relative(s: &str) -> Result<Duration> {
    let (num_str, multiplier) = match s.chars().last() {
        Some('d') => (&s[..s.len() - 1], 1),
        Some('w') => (&s[..s.len() - 1], 7),
        _ => bail!("Use +Nd or +Nw (e.g., +3d, -1w)"),
    };
    let n: i64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid number: {}", num_str))?;
    if n < 0 {
        bail!("Number must be positive");
    }
    n.checked_mul(multiplier)
        .and_then(Duration::try_days)
        .with_context(|| format!("Offset too large: {}", s))
}

/// Describe a follow-up date relative to today.
pub fn format_relative(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        d if d < -1 => format!("{} days overdue", -d),
        -1 => "1 day overdue".into(),
        0 => "today".into(),
        1 => "tomorrow".into(),
        2..=7 => format!("in {} days", days),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}
