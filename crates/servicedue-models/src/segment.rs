//! Customer segments.
//!
//! A [`Segment`] is the closed set of customer categories the dealership
//! works with. Each variant carries everything the rest of the client needs
//! to know about it: the backend segment code, the URL slug of its customer
//! list, a display label and the template designated for its campaigns.
//! Dashboard tabs are segments; there is no separate tab table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::{self, Template};

/// Customer category.
///
/// On the wire a segment is its code (`1ST_FREE`, `PAID_ROUTINE`,
/// `RISK_LOST`). Decoding is lenient: an unrecognized code becomes
/// [`Segment::Routine`], the same fallback the template resolver applies.
/// [`str::parse`] is strict and rejects unknown codes.
///
/// # Examples
///
/// ```
/// use servicedue_models::Segment;
///
/// assert_eq!(Segment::Warranty.code(), "1ST_FREE");
/// assert_eq!("RISK_LOST".parse::<Segment>().unwrap(), Segment::Winback);
/// assert_eq!(Segment::from_code_or_default("SOMETHING"), Segment::Routine);
/// ```
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(into = "&'static str", from = "String")]
pub enum Segment {
    /// Vehicles inside the free-service warranty window.
    #[default]
    #[strum(serialize = "1ST_FREE")]
    Warranty,
    /// Vehicles due for a regular paid service.
    #[strum(serialize = "PAID_ROUTINE")]
    Routine,
    /// Lapsed customers targeted for win-back.
    #[strum(serialize = "RISK_LOST")]
    Winback,
}

impl Segment {
    /// All segments in dashboard tab order.
    pub const ALL: [Segment; 3] = [Segment::Warranty, Segment::Routine, Segment::Winback];

    /// Backend segment code.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Resolve a segment code, falling back to [`Segment::Routine`].
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or(Segment::Routine)
    }

    /// Slug used in the customer-list path (`/api/customers/{slug}`).
    pub fn slug(self) -> &'static str {
        match self {
            Segment::Warranty => "warranty",
            Segment::Routine => "routine",
            Segment::Winback => "winback",
        }
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Segment::Warranty => "Warranty Expiring",
            Segment::Routine => "Service Due",
            Segment::Winback => "Win-back",
        }
    }

    /// Heading of the urgency column for this segment's lead table.
    pub fn urgency_heading(self) -> &'static str {
        match self {
            Segment::Warranty => "Days Left",
            Segment::Routine => "Overdue",
            Segment::Winback => "Last Service",
        }
    }

    /// Id of the template designated for this segment.
    pub fn template_id(self) -> &'static str {
        match self {
            Segment::Warranty => template::WARRANTY_EXPIRY_URGENT,
            Segment::Routine => template::ROUTINE_SERVICE_DUE,
            Segment::Winback => template::WINBACK_OFFER,
        }
    }

    /// The template designated for this segment.
    pub fn template(self) -> &'static Template {
        template::template_for_segment(self)
    }

    /// Position of the segment in [`Segment::ALL`].
    pub fn index(self) -> usize {
        match self {
            Segment::Warranty => 0,
            Segment::Routine => 1,
            Segment::Winback => 2,
        }
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous tab, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Accept a code (any case) or a slug, as typed on a command line.
    pub fn parse_loose(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        Self::ALL.into_iter().find(|s| {
            s.code().eq_ignore_ascii_case(trimmed) || s.slug().eq_ignore_ascii_case(trimmed)
        })
    }
}

impl From<String> for Segment {
    fn from(code: String) -> Self {
        Self::from_code_or_default(&code)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
