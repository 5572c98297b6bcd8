//! Campaign message templates.
//!
//! The registry is a fixed table of three templates, one per [`Segment`].
//! Bodies contain `{placeholder}` tokens filled in by [`Template::render`].
//!
//! ```text
//! 1ST_FREE      → WARRANTY_EXPIRY_URGENT
//! PAID_ROUTINE  → ROUTINE_SERVICE_DUE
//! RISK_LOST     → WINBACK_OFFER
//! anything else → ROUTINE_SERVICE_DUE
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ModelError;
use crate::lead::Lead;
use crate::segment::Segment;

/// Template id for the warranty-expiry reminder.
pub const WARRANTY_EXPIRY_URGENT: &str = "WARRANTY_EXPIRY_URGENT";
/// Template id for the routine paid-service reminder.
pub const ROUTINE_SERVICE_DUE: &str = "ROUTINE_SERVICE_DUE";
/// Template id for the win-back offer.
pub const WINBACK_OFFER: &str = "WINBACK_OFFER";

/// Placeholder keys understood by the registry templates.
pub mod keys {
    /// Customer's full name.
    pub const CUSTOMER_NAME: &str = "customer_name";
    /// Vehicle model, e.g. `Access 125`.
    pub const BIKE_MODEL: &str = "bike_model";
    /// Days remaining (warranty) or overdue (routine).
    pub const DAYS_LEFT: &str = "days_left";
    /// Per-customer booking URL.
    pub const BOOKING_LINK: &str = "booking_link";
}

/// A parameterized message body associated with one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Stable identifier sent with launch requests.
    pub id: &'static str,
    /// Segment the template is written for.
    pub segment: Segment,
    /// Short display name.
    pub name: &'static str,
    /// One-line description shown in the channel drawer.
    pub description: &'static str,
    /// Body with `{placeholder}` tokens.
    pub body: &'static str,
}

static TEMPLATES: [Template; 3] = [
    Template {
        id: WARRANTY_EXPIRY_URGENT,
        segment: Segment::Warranty,
        name: "Warranty Expiry - Urgent",
        description: "Free service reminder for vehicles about to leave warranty",
        body: "Hi {customer_name}, your {bike_model}'s free service warranty expires in {days_left} days! \
Book your FREE service now before it lapses: {booking_link}",
    },
    Template {
        id: ROUTINE_SERVICE_DUE,
        segment: Segment::Routine,
        name: "Routine Service Reminder",
        description: "Periodic paid service reminder",
        body: "Hi {customer_name}, your {bike_model} is due for its routine service. \
Keep it running smoothly - book a convenient slot here: {booking_link}",
    },
    Template {
        id: WINBACK_OFFER,
        segment: Segment::Winback,
        name: "Win-back Offer",
        description: "Discount offer for customers who have not visited in a while",
        body: "Hi {customer_name}, we miss you and your {bike_model}! \
Enjoy 20% off labour charges on your next service. Book now: {booking_link}",
    },
];

/// All registered templates in segment order.
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

/// Look up a template by id.
pub fn template_by_id(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// The template designated for `segment`.
pub fn template_for_segment(segment: Segment) -> &'static Template {
    let id = segment.template_id();
    // The registry holds one template per segment; the fallback keeps this total.
    template_by_id(id).unwrap_or(&TEMPLATES[1])
}

/// Resolve a raw segment code to its template.
///
/// Unknown codes resolve to the routine-service template.
///
/// ```
/// use servicedue_models::template_for_segment_code;
///
/// assert_eq!(template_for_segment_code("1ST_FREE").id, "WARRANTY_EXPIRY_URGENT");
/// assert_eq!(template_for_segment_code("").id, "ROUTINE_SERVICE_DUE");
/// ```
pub fn template_for_segment_code(code: &str) -> &'static Template {
    template_for_segment(Segment::from_code_or_default(code))
}

/// Render template `template_id` with `values`, or with
/// [`PlaceholderValues::sample`] when `values` is `None`.
pub fn render_template(
    template_id: &str,
    values: Option<&PlaceholderValues>,
) -> Result<String, ModelError> {
    let template = template_by_id(template_id).ok_or_else(|| ModelError::UnknownTemplate {
        id: template_id.to_string(),
    })?;
    Ok(match values {
        Some(values) => template.render(values),
        None => template.render(&PlaceholderValues::sample()),
    })
}

impl Template {
    /// Substitute every `{key}` whose key is present in `values`.
    ///
    /// The body is scanned once, left to right. Substituted text is never
    /// scanned again, unknown keys stay literal and a `{` without a closing
    /// brace is copied as-is.
    pub fn render(&self, values: &PlaceholderValues) -> String {
        render_body(self.body, values)
    }

    /// Placeholder keys that occur in the body, in order of first use.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        let mut rest = self.body;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    if !out.contains(&key) {
                        out.push(key);
                    }
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        out
    }
}

fn render_body(body: &str, values: &PlaceholderValues) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match values.get(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// PlaceholderValues
// ---------------------------------------------------------------------------

/// Field-value mapping used to fill template placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderValues(BTreeMap<String, String>);

impl PlaceholderValues {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sample data used for template previews.
    pub fn sample() -> Self {
        Self::new()
            .with(keys::CUSTOMER_NAME, "Rajesh Kumar")
            .with(keys::BIKE_MODEL, "Access 125")
            .with(keys::DAYS_LEFT, "3")
            .with(keys::BOOKING_LINK, "https://servicedue.in/book/sample")
    }

    /// Values for a specific lead.
    ///
    /// `days_left` comes from `daysRemaining`, else `daysOverdue`, and is
    /// left unset when the lead carries neither. The booking link is
    /// `{booking_base_url}/{lead id}`.
    pub fn for_lead(lead: &Lead, booking_base_url: &str) -> Self {
        let mut values = Self::new()
            .with(keys::CUSTOMER_NAME, lead.name.as_str())
            .with(keys::BIKE_MODEL, lead.bike_model.as_str())
            .with(
                keys::BOOKING_LINK,
                format!("{}/{}", booking_base_url.trim_end_matches('/'), lead.id),
            );
        if let Some(days) = lead.days_remaining.or(lead.days_overdue) {
            values.insert(keys::DAYS_LEFT, days.to_string());
        }
        values
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::LeadId;

    #[test]
    fn resolver_returns_matching_template_for_known_codes() {
        for code in ["1ST_FREE", "PAID_ROUTINE", "RISK_LOST"] {
            assert_eq!(template_for_segment_code(code).segment.code(), code);
        }
    }

    #[test]
    fn resolver_falls_back_to_routine() {
        for code in ["", "1st_free", "GOLD", "RISK_LOST "] {
            assert_eq!(template_for_segment_code(code).id, ROUTINE_SERVICE_DUE);
        }
    }

    #[test]
    fn warranty_preview_with_sample_data() {
        let sample = PlaceholderValues::new()
            .with("customer_name", "Rajesh Kumar")
            .with("bike_model", "Access 125")
            .with("days_left", "3")
            .with("booking_link", "https://servicedue.in/book/sample");
        let text = render_template(WARRANTY_EXPIRY_URGENT, Some(&sample)).unwrap();
        assert!(text.contains("Rajesh Kumar"));
        assert!(text.contains("Access 125"));
        assert!(text.contains("3 days"));
        assert!(text.contains("https://servicedue.in/book/sample"));
        assert!(!text.contains("{customer_name}"));
    }

    #[test]
    fn default_values_are_the_sample() {
        let with_default = render_template(WARRANTY_EXPIRY_URGENT, None).unwrap();
        let with_sample =
            render_template(WARRANTY_EXPIRY_URGENT, Some(&PlaceholderValues::sample())).unwrap();
        assert_eq!(with_default, with_sample);
    }

    #[test]
    fn unknown_template_id_is_an_error() {
        assert_eq!(
            render_template("NOPE", None),
            Err(ModelError::UnknownTemplate { id: "NOPE".into() })
        );
    }

    #[test]
    fn repeated_placeholder_is_replaced_everywhere() {
        let values = PlaceholderValues::new().with("name", "Asha");
        assert_eq!(render_body("{name}, yes {name}!", &values), "Asha, yes Asha!");
    }

    #[test]
    fn missing_keys_stay_literal() {
        let values = PlaceholderValues::new().with("a", "1");
        assert_eq!(render_body("{a} {b}", &values), "1 {b}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let values = PlaceholderValues::new()
            .with("a", "{b}")
            .with("b", "boom");
        assert_eq!(render_body("{a}", &values), "{b}");
    }

    #[test]
    fn unclosed_brace_is_copied() {
        let values = PlaceholderValues::new().with("a", "1");
        assert_eq!(render_body("{a} and {oops", &values), "1 and {oops");
    }

    #[test]
    fn placeholders_in_order_of_first_use() {
        let t = template_by_id(WARRANTY_EXPIRY_URGENT).unwrap();
        assert_eq!(
            t.placeholders(),
            vec!["customer_name", "bike_model", "days_left", "booking_link"]
        );
    }

    #[test]
    fn registry_has_one_template_per_segment() {
        assert_eq!(templates().len(), 3);
        for segment in Segment::ALL {
            assert_eq!(templates().iter().filter(|t| t.segment == segment).count(), 1);
        }
    }

    #[test]
    fn values_for_lead() {
        let lead = Lead {
            id: LeadId::new("L-42"),
            name: "Meena Iyer".into(),
            phone: "+919800000000".into(),
            bike_model: "Jupiter".into(),
            vehicle_number: "KA01AB1234".into(),
            segment: Segment::Routine,
            estimated_value: 1200.0,
            days_remaining: None,
            days_overdue: Some(12),
            last_service_date: None,
        };
        let values = PlaceholderValues::for_lead(&lead, "https://servicedue.in/book/");
        assert_eq!(values.get("customer_name"), Some("Meena Iyer"));
        assert_eq!(values.get("days_left"), Some("12"));
        assert_eq!(values.get("booking_link"), Some("https://servicedue.in/book/L-42"));
    }

    #[test]
    fn lead_without_days_keeps_placeholder() {
        let lead = Lead {
            id: LeadId::new("L-1"),
            name: "Arun".into(),
            phone: String::new(),
            bike_model: "Ntorq".into(),
            vehicle_number: String::new(),
            segment: Segment::Winback,
            estimated_value: 0.0,
            days_remaining: None,
            days_overdue: None,
            last_service_date: Some("2024-01-10".into()),
        };
        let values = PlaceholderValues::for_lead(&lead, "https://x");
        assert_eq!(render_body("{days_left}", &values), "{days_left}");
    }
}
