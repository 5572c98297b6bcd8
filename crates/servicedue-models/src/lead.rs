//! Customer leads as returned by the customer-list endpoint.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::segment::Segment;

// ---------------------------------------------------------------------------
// LeadId
// ---------------------------------------------------------------------------

/// Backend identifier of a lead.
///
/// The backend may send ids as strings or integers; both decode to the same
/// textual id.
///
/// # Examples
///
/// ```
/// use servicedue_models::LeadId;
///
/// let a: LeadId = serde_json::from_str("17").unwrap();
/// let b: LeadId = serde_json::from_str("\"17\"").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "17");
/// ```
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeadId(String);

impl LeadId {
    /// Create a new lead id.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for LeadId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LeadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for LeadId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A customer annotated with segment-specific urgency data and the revenue
/// the dealership expects to recover.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(alias = "bike_model", default)]
    pub bike_model: String,
    #[serde(alias = "vehicle_number", default)]
    pub vehicle_number: String,
    pub segment: Segment,
    /// Estimated recoverable value in rupees.
    #[serde(alias = "estimated_value", default)]
    pub estimated_value: f64,
    #[serde(alias = "days_remaining", default, skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(alias = "days_overdue", default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    #[serde(alias = "last_service_date", default, skip_serializing_if = "Option::is_none")]
    pub last_service_date: Option<String>,
}

/// How pressing a lead is, in the terms of its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Days left before the warranty window closes.
    DaysRemaining(i64),
    /// Days past the due date of a routine service.
    DaysOverdue(i64),
    /// Date of the last recorded visit.
    LastService(NaiveDate),
    /// The lead carries no urgency data.
    Unknown,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::DaysRemaining(1) => f.write_str("1 day"),
            Urgency::DaysRemaining(n) => write!(f, "{n} days"),
            Urgency::DaysOverdue(n) => write!(f, "{n}d overdue"),
            Urgency::LastService(date) => write!(f, "{}", date.format("%d %b %Y")),
            Urgency::Unknown => f.write_str("-"),
        }
    }
}

impl Lead {
    /// Parsed `lastServiceDate`; accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn last_service_date(&self) -> Option<NaiveDate> {
        let raw = self.last_service_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    /// Urgency figure for the lead table.
    pub fn urgency(&self) -> Urgency {
        if let Some(days) = self.days_remaining {
            Urgency::DaysRemaining(days)
        } else if let Some(days) = self.days_overdue {
            Urgency::DaysOverdue(days)
        } else if let Some(date) = self.last_service_date() {
            Urgency::LastService(date)
        } else {
            Urgency::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// LeadPage
// ---------------------------------------------------------------------------

/// One page of the customer list for a segment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LeadPage {
    pub customers: Vec<Lead>,
    /// Total customers in the segment.
    #[serde(default)]
    pub total: u64,
    /// Number of customers in this page.
    #[serde(default)]
    pub showing: u64,
    #[serde(default)]
    pub has_more: bool,
}

impl LeadPage {
    /// Lead with the given id, if displayed.
    pub fn find(&self, id: &LeadId) -> Option<&Lead> {
        self.customers.iter().find(|l| &l.id == id)
    }

    /// `true` when `id` is part of this page.
    pub fn contains(&self, id: &LeadId) -> bool {
        self.find(id).is_some()
    }
}

/// Paging parameters for the customer-list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// First page with `limit` entries.
    pub fn first(limit: u32) -> Self {
        Self { page: 1, limit }
    }

    /// The page after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(50)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
