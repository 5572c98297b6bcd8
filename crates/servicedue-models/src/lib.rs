//! # ServiceDue Models
//!
//! Domain types and pure logic for the ServiceDue dealership client.
//! Nothing in this crate performs I/O; the SDK and the CLI build on it.
//!
//! ## Campaign flow
//!
//! ```text
//! LeadPage ──select──▶ Dashboard ──open_drawer──▶ CampaignFlow
//!                          │                           │
//!                  CampaignQuote (pricing)   CampaignLaunchRequest
//!                  Template::render (preview)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`segment`] | `Segment` (warranty / routine / win-back) and its metadata |
//! | [`lead`] | `Lead`, `LeadId`, `LeadPage`, `PageRequest`, `Urgency` |
//! | [`template`] | Template registry, resolver and placeholder renderer |
//! | [`channel`] | Messaging channel catalog |
//! | [`pricing`] | `Amount` and `CampaignQuote` |
//! | [`campaign`] | Launch request and receipt |
//! | [`flow`] | Launch state machine |
//! | [`dashboard`] | Segment tabs, selection and flow combined |
//! | [`auth`] | Authentication request / response bodies |
//! | [`validation`] | Sign-in, sign-up and reset form rules |

pub mod auth;
pub mod campaign;
pub mod channel;
pub mod dashboard;
pub mod error;
pub mod flow;
pub mod lead;
pub mod pricing;
pub mod segment;
pub mod template;
pub mod validation;

// Re-export all public types at crate root for convenience.
pub use auth::*;
pub use campaign::*;
pub use channel::*;
pub use dashboard::*;
pub use error::*;
pub use flow::*;
pub use lead::*;
pub use pricing::*;
pub use segment::*;
pub use template::*;
pub use validation::*;
