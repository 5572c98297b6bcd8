mod app_state;
mod commands;
mod logging;
mod tui;
mod ui;

use clap::{Args, Parser, Subcommand};
use servicedue_sdk::{Channel, Segment};

use crate::commands::Context;

#[derive(Parser, Debug)]
#[command(name = "servicedue")]
#[command(about = "ServiceDue dealership campaign client")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides SERVICEDUE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    Signin(SignInArgs),
    /// Create a dealership account
    Signup(SignUpArgs),
    /// Request a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Signout,
    /// Show the signed-in user
    Whoami,
    /// List the customers of a segment
    Customers(CustomersArgs),
    /// List the message templates
    Templates,
    /// Render a template with sample data
    Preview(PreviewArgs),
    /// Price a campaign without sending it
    Quote(CampaignArgs),
    /// Send a campaign
    Launch(LaunchArgs),
    /// Interactive campaign dashboard
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug)]
pub struct SignInArgs {
    #[arg(long)]
    pub email: String,

    /// Read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignUpArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub dealership_name: String,

    /// Read (twice) from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct CustomersArgs {
    /// Segment code or slug (warranty, routine, winback)
    #[arg(value_parser = parse_segment)]
    pub segment: Segment,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Page size (defaults to SERVICEDUE_PAGE_SIZE)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Print the raw page as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Template id (see `servicedue templates`)
    pub template_id: String,

    /// Override a placeholder, e.g. --set customer_name=Asha
    #[arg(long = "set", value_parser = parse_key_val)]
    pub values: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct CampaignArgs {
    /// Segment code or slug (warranty, routine, winback)
    #[arg(value_parser = parse_segment)]
    pub segment: Segment,

    /// whatsapp, voice or mix
    #[arg(long, value_parser = parse_channel)]
    pub channel: Channel,

    /// Customer id to include; repeatable. Every listed customer when omitted
    #[arg(long = "lead")]
    pub leads: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Args, Debug)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Segment shown first
    #[arg(long, value_parser = parse_segment, default_value = "warranty")]
    pub segment: Segment,
}

fn parse_segment(s: &str) -> Result<Segment, String> {
    Segment::parse_loose(s).ok_or_else(|| {
        format!("unknown segment `{s}` (expected warranty, routine or winback)")
    })
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    Channel::from_id(s).map_err(|e| e.to_string())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Dashboard(_)) {
        logging::init_file()?;
    } else {
        logging::init_stderr();
    }

    let ctx = Context::from_env(cli.api_url)?;

    match cli.command {
        Commands::Signin(args) => commands::sign_in(&ctx, args).await,
        Commands::Signup(args) => commands::sign_up(&ctx, args).await,
        Commands::ResetPassword { email } => commands::reset_password(&ctx, email).await,
        Commands::Signout => commands::sign_out(&ctx),
        Commands::Whoami => commands::whoami(&ctx),
        Commands::Customers(args) => commands::customers(&ctx, args).await,
        Commands::Templates => {
            commands::list_templates();
            Ok(())
        }
        Commands::Preview(args) => commands::preview(&args),
        Commands::Quote(args) => commands::quote(&ctx, &args).await,
        Commands::Launch(args) => commands::launch(&ctx, args).await,
        Commands::Dashboard(args) => commands::dashboard(&ctx, args.segment).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_launch_with_leads() {
        let cli = Cli::try_parse_from([
            "servicedue", "launch", "winback", "--channel", "voice", "--lead", "4", "--lead", "9",
            "-y",
        ])
        .unwrap();
        match cli.command {
            Commands::Launch(args) => {
                assert_eq!(args.campaign.segment, Segment::Winback);
                assert_eq!(args.campaign.channel, Channel::Voice);
                assert_eq!(args.campaign.leads, vec!["4", "9"]);
                assert!(args.yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_segment_and_channel() {
        assert!(Cli::try_parse_from(["servicedue", "customers", "gold"]).is_err());
        assert!(
            Cli::try_parse_from(["servicedue", "quote", "routine", "--channel", "sms"]).is_err()
        );
    }

    #[test]
    fn dashboard_defaults_to_warranty() {
        let cli = Cli::try_parse_from(["servicedue", "dashboard"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Dashboard(DashboardArgs {
                segment: Segment::Warranty
            })
        ));
    }

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_val("customer_name=Asha Rao").unwrap(),
            ("customer_name".to_string(), "Asha Rao".to_string())
        );
        assert_eq!(
            parse_key_val("booking_link=https://x/y?a=b").unwrap().1,
            "https://x/y?a=b"
        );
        assert!(parse_key_val("nope").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
