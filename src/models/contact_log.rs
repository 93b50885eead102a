use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LeadError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[default]
    Phone,
    Email,
    Text,
    InPerson,
}

impl ContactMethod {
    pub const ALL: [ContactMethod; 4] = [Self::Phone, Self::Email, Self::Text, Self::InPerson];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Text => "text",
            Self::InPerson => "in_person",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Phone => "Phone Call",
            Self::Email => "Email",
            Self::Text => "Text Message",
            Self::InPerson => "In Person",
        }
    }

    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for ContactMethod {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "phone" | "call" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "text" | "sms" => Ok(Self::Text),
            "in_person" | "visit" => Ok(Self::InPerson),
            _ => Err(LeadError::validation(format!("unknown contact method: {}", s))),
        }
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactOutcome {
    NoAnswer,
    Answered,
    Voicemail,
    CallbackRequested,
    NotInterested,
    Interested,
    MeetingScheduled,
}

impl ContactOutcome {
    pub const ALL: [ContactOutcome; 7] = [
        Self::NoAnswer,
        Self::Answered,
        Self::Voicemail,
        Self::CallbackRequested,
        Self::NotInterested,
        Self::Interested,
        Self::MeetingScheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAnswer => "no_answer",
            Self::Answered => "answered",
            Self::Voicemail => "voicemail",
            Self::CallbackRequested => "callback_requested",
            Self::NotInterested => "not_interested",
            Self::Interested => "interested",
            Self::MeetingScheduled => "meeting_scheduled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoAnswer => "No Answer",
            Self::Answered => "Answered",
            Self::Voicemail => "Left Voicemail",
            Self::CallbackRequested => "Callback Requested",
            Self::NotInterested => "Not Interested",
            Self::Interested => "Interested",
            Self::MeetingScheduled => "Meeting Scheduled",
        }
    }

    /// Stored rows predating a known outcome read back as `NoAnswer`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::NoAnswer)
    }

    /// Outcomes that by convention carry a follow-up date.
    pub fn expects_follow_up(&self) -> bool {
        matches!(
            self,
            Self::CallbackRequested | Self::MeetingScheduled | Self::Interested
        )
    }
}

impl FromStr for ContactOutcome {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == key)
            .ok_or_else(|| LeadError::validation(format!("unknown contact outcome: {}", s)))
    }
}

impl fmt::Display for ContactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One outreach attempt. Append-only: the workflow never edits a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLog {
    pub id: Uuid,
    pub property_id: Uuid,
    pub contact_date: NaiveDate,
    pub contact_method: ContactMethod,
    pub outcome: ContactOutcome,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl ContactLog {
    pub fn new(
        property_id: Uuid,
        contact_date: NaiveDate,
        contact_method: ContactMethod,
        outcome: ContactOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            contact_date,
            contact_method,
            outcome,
            notes: None,
            follow_up_date: None,
            created_at: Utc::now(),
        }
    }
}

/// The only fields of a log that may be corrected after the fact.
/// The property link is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactLogPatch {
    pub notes: Option<Option<String>>,
    pub follow_up_date: Option<Option<NaiveDate>>,
}

impl ContactLogPatch {
    pub fn apply_to(&self, log: &ContactLog) -> ContactLog {
        let mut updated = log.clone();
        if let Some(ref notes) = self.notes {
            updated.notes = notes.clone();
        }
        if let Some(date) = self.follow_up_date {
            updated.follow_up_date = date;
        }
        updated
    }
}
