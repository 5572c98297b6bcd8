//! Campaign cost and revenue computation.
//!
//! Amounts are held as integer paise so that `n × unit cost` is exact;
//! rounding only happens when a rupee figure from the backend is converted.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::Serialize;

use crate::channel::Channel;
use crate::lead::Lead;

/// A rupee amount in paise.
///
/// # Examples
///
/// ```
/// use servicedue_models::Amount;
///
/// assert_eq!(Amount::from_paise(70).to_string(), "₹0.70");
/// assert_eq!(Amount::from_rupees(1234.567).to_string(), "₹1234.57");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(i64);

impl Amount {
    /// Zero rupees.
    pub const ZERO: Amount = Amount(0);

    /// Amount from paise.
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Amount from a rupee value, rounded to the nearest paisa.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_rupees(rupees: f64) -> Self {
        Self((rupees * 100.0).round() as i64)
    }

    /// Value in paise.
    pub const fn paise(self) -> i64 {
        self.0
    }

    /// Value in rupees.
    #[allow(clippy::cast_precision_loss)]
    pub fn rupees(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Mul<usize> for Amount {
    type Output = Amount;

    #[allow(clippy::cast_possible_wrap)]
    fn mul(self, rhs: usize) -> Amount {
        Amount(self.0 * rhs as i64)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

// ---------------------------------------------------------------------------
// CampaignQuote
// ---------------------------------------------------------------------------

/// Cost and expected revenue of sending one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampaignQuote {
    pub channel: Channel,
    pub recipients: usize,
    pub unit_cost: Amount,
    /// `recipients × unit_cost`.
    pub total_cost: Amount,
    /// Sum of the recipients' estimated values.
    pub total_revenue: Amount,
}

impl CampaignQuote {
    /// Price a campaign on `channel` for `leads`.
    ///
    /// No clamping is applied; negative estimated values reduce the revenue.
    pub fn new<'a>(channel: Channel, leads: impl IntoIterator<Item = &'a Lead>) -> Self {
        let mut recipients = 0;
        let mut total_revenue = Amount::ZERO;
        for lead in leads {
            recipients += 1;
            total_revenue = total_revenue + Amount::from_rupees(lead.estimated_value);
        }
        let unit_cost = channel.unit_cost();
        Self {
            channel,
            recipients,
            unit_cost,
            total_cost: unit_cost * recipients,
            total_revenue,
        }
    }
}
