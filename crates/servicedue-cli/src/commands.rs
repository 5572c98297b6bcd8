//! Non-interactive subcommands.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Context as _, Result};
use servicedue_models::{render_template, Amount, CampaignQuote, PlaceholderValues, Template};
use servicedue_sdk::{
    CampaignRunner, Dashboard, LaunchEvent, Lead, LeadId, LeadPage, PageRequest,
    ProgressConfig, ResetPasswordForm, SdkConfig, SdkError, Segment, ServiceDueClient, Session,
    SessionStore, SignInForm, SignUpForm,
};
use tracing::{debug, info};

use crate::{CampaignArgs, CustomersArgs, LaunchArgs, PreviewArgs, SignInArgs, SignUpArgs};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Configuration and session store shared by every subcommand.
pub struct Context {
    pub config: SdkConfig,
    pub store: SessionStore,
}

impl Context {
    pub fn from_env(api_url: Option<String>) -> Result<Self> {
        let mut config = SdkConfig::from_env();
        if let Some(url) = api_url {
            config.api_url = url;
        }
        let store = SessionStore::default_location()?;
        debug!(api_url = %config.api_url, session = %store.path().display(), "configured");
        Ok(Self { config, store })
    }

    fn anonymous_client(&self) -> Result<ServiceDueClient> {
        Ok(ServiceDueClient::new(&self.config)?)
    }

    /// The stored session, or a user-facing error.
    pub fn session(&self) -> Result<Session> {
        self.store.require().map_err(|e| match e {
            SdkError::NotSignedIn => anyhow!("not signed in; run `servicedue signin` first"),
            SdkError::SessionExpired => {
                anyhow!("your session has expired; run `servicedue signin` again")
            }
            other => anyhow::Error::new(other),
        })
    }

    /// Client authenticated with the stored session.
    pub fn client(&self) -> Result<ServiceDueClient> {
        Ok(self.anonymous_client()?.with_session(self.session()?))
    }

    /// Report a failed authenticated call. A rejected token also clears
    /// the stored session.
    pub fn fail(&self, err: SdkError) -> anyhow::Error {
        debug!(error = %err, "request failed");
        self.report(err.banner(), err.is_auth_failure())
    }

    fn report(&self, message: String, signed_out: bool) -> anyhow::Error {
        if signed_out {
            match self.store.clear() {
                Ok(true) => {
                    return anyhow!("{}. Please sign in again.", message.trim_end_matches('.'));
                }
                Ok(false) => {}
                Err(e) => {
                    return anyhow!("{message}; additionally failed to clear session: {e}");
                }
            }
        }
        anyhow!(message)
    }

    fn remember(&self, auth: servicedue_sdk::AuthResponse) -> Result<Session> {
        let session = Session::new(auth, self.config.session_ttl);
        self.store.save(&session)?;
        Ok(session)
    }
}

/// Report a failed sign-in, sign-up or reset. These calls carry no token,
/// so a `401` means bad credentials and the stored session stays.
fn rejected(err: &SdkError) -> anyhow::Error {
    debug!(error = %err, "request rejected");
    anyhow!(err.banner())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(given: Option<String>, label: &str) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => prompt(label),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

pub async fn sign_in(ctx: &Context, args: SignInArgs) -> Result<()> {
    let form = SignInForm {
        email: args.email,
        password: password_or_prompt(args.password, "Password: ")?,
    };
    let request = form.validate()?;
    let auth = ctx
        .anonymous_client()?
        .sign_in(&request)
        .await
        .map_err(|e| rejected(&e))?;
    let session = ctx.remember(auth)?;
    info!(user = %session.user.email, "signed in");
    println!(
        "Signed in as {} ({})",
        session.user.display_name(),
        session.user.dealership_name
    );
    Ok(())
}

pub async fn sign_up(ctx: &Context, args: SignUpArgs) -> Result<()> {
    let (password, confirm_password) = match args.password {
        Some(password) => (password.clone(), password),
        None => (prompt("Password: ")?, prompt("Confirm password: ")?),
    };
    let form = SignUpForm {
        email: args.email,
        password,
        confirm_password,
        first_name: args.first_name,
        last_name: args.last_name,
        dealership_name: args.dealership_name,
    };
    let request = form.validate()?;
    let auth = ctx
        .anonymous_client()?
        .sign_up(&request)
        .await
        .map_err(|e| rejected(&e))?;
    let session = ctx.remember(auth)?;
    println!(
        "Welcome, {}. {} is ready to send campaigns.",
        session.user.display_name(),
        session.user.dealership_name
    );
    Ok(())
}

pub async fn reset_password(ctx: &Context, email: String) -> Result<()> {
    let request = ResetPasswordForm { email }.validate()?;
    ctx.anonymous_client()?
        .reset_password(&request)
        .await
        .map_err(|e| rejected(&e))?;
    println!("If an account exists for {}, a reset link is on its way.", request.email);
    Ok(())
}

pub fn sign_out(ctx: &Context) -> Result<()> {
    if ctx.store.clear()? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let user = &session.user;
    println!("{} <{}>", user.display_name(), user.email);
    if !user.dealership_name.is_empty() {
        println!("Dealership: {}", user.dealership_name);
    }
    println!(
        "Session expires {}",
        session
            .expires_at
            .with_timezone(&chrono::Local)
            .format("%d %b %Y %H:%M")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Customers & templates
// ---------------------------------------------------------------------------

async fn fetch_page(
    ctx: &Context,
    client: &ServiceDueClient,
    segment: Segment,
    page: PageRequest,
) -> Result<LeadPage> {
    client
        .customers(segment, page)
        .await
        .map_err(|e| ctx.fail(e))
}

fn print_leads(segment: Segment, leads: &[Lead]) {
    println!(
        "{:<8} {:<22} {:<15} {:<14} {:<12} {:<14} {:>10}",
        "ID",
        "Customer",
        "Phone",
        "Bike",
        "Vehicle",
        segment.urgency_heading(),
        "Value"
    );
    for lead in leads {
        println!(
            "{:<8} {:<22} {:<15} {:<14} {:<12} {:<14} {:>10}",
            lead.id.as_str(),
            lead.name,
            lead.phone,
            lead.bike_model,
            lead.vehicle_number,
            lead.urgency().to_string(),
            Amount::from_rupees(lead.estimated_value).to_string()
        );
    }
}

pub async fn customers(ctx: &Context, args: CustomersArgs) -> Result<()> {
    let client = ctx.client()?;
    let request = PageRequest {
        page: args.page.max(1),
        limit: args.limit.unwrap_or(ctx.config.page_size),
    };
    let page = fetch_page(ctx, &client, args.segment, request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("{}", args.segment.label());
    if page.customers.is_empty() {
        println!("No customers in this segment.");
        return Ok(());
    }
    print_leads(args.segment, &page.customers);
    println!();
    println!("Showing {} of {}", page.customers.len(), page.total);
    if page.has_more {
        println!("More available with --page {}", request.next().page);
    }
    Ok(())
}

pub fn list_templates() {
    for template in servicedue_models::templates() {
        println!(
            "{:<24} {:<13} {}",
            template.id,
            template.segment.code(),
            template.name
        );
        println!("{:<24} {}", "", template.description);
        println!("{:<24} {}", "", placeholder_line(template));
    }
}

fn placeholder_line(template: &Template) -> String {
    let keys: Vec<String> = template
        .placeholders()
        .into_iter()
        .map(|key| format!("{{{key}}}"))
        .collect();
    format!("Placeholders: {}", keys.join(" "))
}

pub fn preview(args: &PreviewArgs) -> Result<()> {
    let mut values = PlaceholderValues::sample();
    for (key, value) in &args.values {
        values.insert(key, value.as_str());
    }
    let text = render_template(&args.template_id, Some(&values))?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// Load the segment and select the requested customers (all when none given).
async fn select_leads(
    ctx: &Context,
    client: &ServiceDueClient,
    args: &CampaignArgs,
) -> Result<Dashboard> {
    let request = PageRequest {
        page: args.page.max(1),
        limit: ctx.config.page_size,
    };
    let page = fetch_page(ctx, client, args.segment, request).await?;
    let mut dashboard = Dashboard::new(args.segment);
    dashboard.replace_leads(args.segment, page);

    if args.leads.is_empty() {
        dashboard.select_all();
    } else {
        let wanted: BTreeSet<LeadId> = args.leads.iter().map(|id| LeadId::new(id.trim())).collect();
        for id in &wanted {
            if !dashboard.toggle(id) {
                bail!(
                    "customer {id} is not on page {} of {}",
                    request.page,
                    args.segment.label()
                );
            }
        }
    }
    if dashboard.selected_count() == 0 {
        bail!("no customers to send to in {}", args.segment.label());
    }
    Ok(dashboard)
}

fn print_quote(segment: Segment, quote: &CampaignQuote) {
    println!("Segment:           {} ({})", segment.label(), segment.code());
    println!("Template:          {}", segment.template_id());
    println!(
        "Channel:           {} ({} per message)",
        quote.channel.label(),
        quote.unit_cost
    );
    println!("Recipients:        {}", quote.recipients);
    println!("Total cost:        {}", quote.total_cost);
    println!("Potential revenue: {}", quote.total_revenue);
}

pub async fn quote(ctx: &Context, args: &CampaignArgs) -> Result<()> {
    let client = ctx.client()?;
    let dashboard = select_leads(ctx, &client, args).await?;
    print_quote(args.segment, &dashboard.quote(args.channel));
    Ok(())
}

pub async fn launch(ctx: &Context, args: LaunchArgs) -> Result<()> {
    let LaunchArgs { campaign, yes } = args;
    let client = ctx.client()?;
    let mut dashboard = select_leads(ctx, &client, &campaign).await?;

    print_quote(campaign.segment, &dashboard.quote(campaign.channel));
    println!();
    println!("{}", dashboard.preview(&ctx.config.booking_url));
    println!();

    if !dashboard.open_drawer() || !dashboard.choose_channel(campaign.channel) {
        bail!("could not start a campaign");
    }
    dashboard.confirm_drawer();

    if !yes {
        let answer = prompt(&format!(
            "Send to {} customers? [y/N] ",
            dashboard.selected_count()
        ))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            dashboard.cancel();
            println!("Cancelled.");
            return Ok(());
        }
    }

    let request = dashboard
        .confirm_launch()
        .context("campaign was not confirmed")?;
    let progress = ProgressConfig {
        hold: Duration::ZERO,
        ..ProgressConfig::default()
    };
    let mut events = CampaignRunner::spawn(
        async move { client.launch_campaign(&request).await },
        progress,
    );

    let mut last_shown = None;
    while let Some(event) = events.recv().await {
        match event {
            LaunchEvent::Progress(p) => {
                dashboard.record_progress(p);
                let bucket = p.percent() / 10;
                if last_shown != Some(bucket) {
                    last_shown = Some(bucket);
                    eprint!("\rLaunching... {:>3}%", p.percent());
                    io::stderr().flush()?;
                }
            }
            LaunchEvent::Completed(receipt) => {
                dashboard.launch_succeeded();
                eprintln!();
                let mut line = String::from("Campaign launched");
                if let Some(id) = &receipt.campaign_id {
                    write!(line, " (id {id})")?;
                }
                if let Some(queued) = receipt.queued {
                    write!(line, ", {queued} messages queued")?;
                }
                println!("{line}.");
            }
            LaunchEvent::Failed {
                message,
                signed_out,
            } => {
                dashboard.launch_failed(message.as_str());
                eprintln!();
                dashboard.dismiss();
                let err = ctx.report(message, signed_out);
                bail!("campaign launch failed: {err}");
            }
            LaunchEvent::Dismissed => {
                dashboard.dismiss();
            }
        }
    }
    Ok(())
}

pub async fn dashboard(ctx: &Context, segment: Segment) -> Result<()> {
    let client = ctx.client()?;
    crate::ui::dashboard::run(client, ctx.config.clone(), ctx.store.clone(), segment).await
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use servicedue_sdk::{AuthResponse, User};

    use super::*;

    fn signed_in(dir: &tempfile::TempDir) -> Context {
        let store = SessionStore::at(dir.path().join("session.json"));
        let auth = AuthResponse {
            token: "tok-live".into(),
            user: User {
                id: "7".into(),
                email: "owner@raomotors.in".into(),
                first_name: "Sunil".into(),
                last_name: "Rao".into(),
                dealership_name: "Rao Motors".into(),
            },
        };
        store
            .save(&Session::new(auth, TimeDelta::hours(24)))
            .unwrap();
        Context {
            config: SdkConfig::default(),
            store,
        }
    }

    #[test]
    fn wrong_password_keeps_existing_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&dir);
        let err = rejected(&SdkError::Unauthorized("Invalid email or password".into()));
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(ctx.store.path().exists());
        assert!(ctx.session().is_ok());
    }

    #[test]
    fn rejected_token_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&dir);
        let err = ctx.fail(SdkError::Unauthorized("Token has expired".into()));
        assert_eq!(err.to_string(), "Token has expired. Please sign in again.");
        assert!(!ctx.store.path().exists());
    }

    #[test]
    fn other_failures_keep_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&dir);
        let err = ctx.fail(SdkError::Config("timeout out of range".into()));
        assert_eq!(err.to_string(), servicedue_sdk::GENERIC_FAILURE);
        assert!(ctx.store.path().exists());
    }

    #[test]
    fn signed_out_launch_failure_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&dir);
        let err = ctx.report("Token has been revoked".into(), true);
        assert_eq!(err.to_string(), "Token has been revoked. Please sign in again.");
        assert!(!ctx.store.path().exists());
    }

    #[test]
    fn template_listing_names_placeholders() {
        let template = servicedue_models::template_by_id("WARRANTY_EXPIRY_URGENT").unwrap();
        assert_eq!(
            placeholder_line(template),
            "Placeholders: {customer_name} {bike_model} {days_left} {booking_link}"
        );
    }

    #[test]
    fn plain_launch_failure_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&dir);
        let err = ctx.report("Provider down".into(), false);
        assert_eq!(err.to_string(), "Provider down");
        assert!(ctx.store.path().exists());
    }
}
