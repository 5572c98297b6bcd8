//! # ServiceDue SDK
//!
//! Client-side plumbing for the **ServiceDue** dealership campaign backend.
//!
//! The SDK provides:
//!
//! * [`ServiceDueClient`]: authenticated REST client for sign-in, the
//!   customer lists and campaign launches.
//! * [`ApiRoutes`]: canonical endpoint paths.
//! * [`Session`] / [`SessionStore`]: the signed-in context and its
//!   on-disk lifecycle.
//! * [`CampaignRunner`]: drives launch progress from the real launch
//!   outcome.
//! * [`SdkConfig`] / [`ProgressConfig`]: environment-driven settings.
//! * [`SdkError`]: unified error type for all SDK operations.
//!
//! Domain types from [`servicedue_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use servicedue_sdk::{SdkConfig, ServiceDueClient, Session, SignInForm};
//!
//! # async fn run() -> Result<(), servicedue_sdk::SdkError> {
//! let config = SdkConfig::from_env();
//! let client = ServiceDueClient::new(&config)?;
//!
//! let form = SignInForm {
//!     email: "owner@raomotors.in".into(),
//!     password: "hunter2hunter2".into(),
//! };
//! let auth = client.sign_in(&form.validate()?).await?;
//! let client = client.with_session(Session::new(auth, config.session_ttl));
//!
//! let page = client
//!     .customers(servicedue_sdk::Segment::Warranty, servicedue_sdk::PageRequest::default())
//!     .await?;
//! println!("{} leads", page.customers.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod runner;
pub mod session;

pub use client::ServiceDueClient;
pub use config::{ProgressConfig, SdkConfig};
pub use error::{SdkError, GENERIC_FAILURE};
pub use routes::ApiRoutes;
pub use runner::{CampaignRunner, LaunchEvent};
pub use session::{Session, SessionStore};

// Re-export the domain types most callers need alongside the client.
pub use servicedue_models::{
    AuthResponse, CampaignFlow, CampaignLaunchRequest, CampaignQuote, Channel, Dashboard,
    FlowState, LaunchOutcome, LaunchReceipt, Lead,
    LeadId, LeadPage, PageRequest, Progress, ResetPasswordForm, Segment, SignInForm, SignUpForm,
    User,
};
