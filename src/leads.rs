//! Lead classification
//!
//! Derives outreach priority from a property's stored fields and an explicit
//! evaluation time. Everything here is pure: no store access, no clock reads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::error::{LeadError, Result};
use crate::models::{ContactLog, LeadStatus, Property};

/// Minimum days on market before a listing counts as a lead.
pub const WARM_MIN_DAYS: i64 = 14;
pub const HOT_MIN_DAYS: i64 = 21;
pub const VERY_HOT_MIN_DAYS: i64 = 30;

/// Window for the "added this week" statistic.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Warm,
    Hot,
    VeryHot,
}

impl PriorityTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Warm => "Warm",
            Self::Hot => "Hot",
            Self::VeryHot => "Very Hot",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Segments of the leads page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadTab {
    #[default]
    All,
    Hot,
    Warm,
    Contacted,
}

impl LeadTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Contacted => "contacted",
        }
    }
}

impl FromStr for LeadTab {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "contacted" => Ok(Self::Contacted),
            _ => Err(LeadError::validation(format!(
                "unknown tab: {} (use all, hot, warm, contacted)",
                s
            ))),
        }
    }
}

/// Whole days between the posting date and `now`'s calendar date.
/// Future postings clamp to 0. `None` when the posting date is unknown.
pub fn days_on_market(property: &Property, now: DateTime<Utc>) -> Option<i64> {
    let posted = property.posting_date?;
    Some((now.date_naive() - posted).num_days().max(0))
}

pub fn priority_tier(days: i64) -> Option<PriorityTier> {
    match days {
        d if d >= VERY_HOT_MIN_DAYS => Some(PriorityTier::VeryHot),
        d if d >= HOT_MIN_DAYS => Some(PriorityTier::Hot),
        d if d >= WARM_MIN_DAYS => Some(PriorityTier::Warm),
        _ => None,
    }
}

/// Statuses that take a property out of the outreach queue.
fn is_engaged_or_closed(status: LeadStatus) -> bool {
    status == LeadStatus::Contacted || status.is_terminal()
}

pub fn is_hot_lead(property: &Property, now: DateTime<Utc>) -> bool {
    let Some(days) = days_on_market(property, now) else {
        return false;
    };
    days >= WARM_MIN_DAYS && property.is_still_listed && !is_engaged_or_closed(property.lead_status)
}

/// Tier of a hot lead; `None` for anything that is not one.
pub fn lead_priority(property: &Property, now: DateTime<Utc>) -> Option<PriorityTier> {
    if !is_hot_lead(property, now) {
        return None;
    }
    days_on_market(property, now).and_then(priority_tier)
}

pub fn hot_leads(properties: &[Property], now: DateTime<Utc>) -> Vec<&Property> {
    properties.iter().filter(|p| is_hot_lead(p, now)).collect()
}

/// Subset of `properties` shown under `tab`.
///
/// `hot` and `warm` narrow the hot-lead set by tier; `contacted` ignores day
/// count and shows every property already reached.
pub fn filter_by_tab(properties: &[Property], tab: LeadTab, now: DateTime<Utc>) -> Vec<&Property> {
    match tab {
        LeadTab::All => hot_leads(properties, now),
        LeadTab::Hot => properties
            .iter()
            .filter(|p| lead_priority(p, now) == Some(PriorityTier::VeryHot))
            .collect(),
        LeadTab::Warm => properties
            .iter()
            .filter(|p| lead_priority(p, now) == Some(PriorityTier::Warm))
            .collect(),
        LeadTab::Contacted => properties
            .iter()
            .filter(|p| p.lead_status == LeadStatus::Contacted)
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub very_hot: usize,
    pub warm: usize,
    pub contacted: usize,
    /// Hot leads whose owner has shown interest. Not a tab of its own.
    pub interested: usize,
}

pub fn tab_counts(properties: &[Property], now: DateTime<Utc>) -> TabCounts {
    let all = filter_by_tab(properties, LeadTab::All, now);
    TabCounts {
        interested: all
            .iter()
            .filter(|p| p.lead_status == LeadStatus::Interested)
            .count(),
        all: all.len(),
        very_hot: filter_by_tab(properties, LeadTab::Hot, now).len(),
        warm: filter_by_tab(properties, LeadTab::Warm, now).len(),
        contacted: filter_by_tab(properties, LeadTab::Contacted, now).len(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_properties: usize,
    pub hot_leads: usize,
    pub avg_price: f64,
    pub added_this_week: usize,
    pub contacted_this_month: usize,
}

pub fn aggregate_stats(
    properties: &[Property],
    contact_logs: &[ContactLog],
    now: DateTime<Utc>,
) -> DashboardStats {
    let total_properties = properties.len();
    // Missing prices count as zero but still weigh in the mean.
    let avg_price = if total_properties == 0 {
        0.0
    } else {
        let total: f64 = properties.iter().map(|p| p.price.unwrap_or(0.0)).sum();
        total / total_properties as f64
    };

    let week_ago = now - Duration::days(RECENT_WINDOW_DAYS);
    let added_this_week = properties
        .iter()
        .filter(|p| p.created_at > week_ago && p.created_at <= now)
        .count();

    let today = now.date_naive();
    let contacted_this_month = contact_logs
        .iter()
        .filter(|log| {
            log.contact_date.year() == today.year() && log.contact_date.month() == today.month()
        })
        .count();

    DashboardStats {
        total_properties,
        hot_leads: hot_leads(properties, now).len(),
        avg_price,
        added_this_week,
        contacted_this_month,
    }
}

/// Hot leads, longest on market first.
pub fn hot_leads_by_urgency(
    properties: &[Property],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<&Property> {
    let mut leads = hot_leads(properties, now);
    leads.sort_by_key(|p| std::cmp::Reverse(days_on_market(p, now).unwrap_or(0)));
    leads.truncate(limit);
    leads
}

/// Newest additions first.
pub fn recent_properties(properties: &[Property], limit: usize) -> Vec<&Property> {
    let mut recent: Vec<&Property> = properties.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(limit);
    recent
}

/// Property-list filter: case-insensitive match on address, city or owner
/// name, optionally restricted to one status.
pub fn search_properties<'a>(
    properties: &'a [Property],
    query: &str,
    status: Option<LeadStatus>,
) -> Vec<&'a Property> {
    let needle = query.trim().to_lowercase();
    properties
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.address.to_lowercase().contains(&needle)
                || p.city.to_lowercase().contains(&needle)
                || p.owner_name.to_lowercase().contains(&needle)
        })
        .filter(|p| status.map_or(true, |s| p.lead_status == s))
        .collect()
}
