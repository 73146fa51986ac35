// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Spyglass CLI - listing monitor dashboard from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Dashboard: listings with their recent alert counts
//! spyglass
//!
//! # Second page of listings in group 3
//! spyglass asins list --page 2 --group 3
//!
//! # Everything about one listing
//! spyglass asins show 42 --range 7d
//!
//! # Price alerts as JSON
//! spyglass alerts --type PRICE_CHANGE --format json --pretty
//!
//! # Manage groups
//! spyglass groups add "Kitchen" --description "Kitchen gadgets"
//! ```

mod commands;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use spyglass_fetch::{ApiClient, ClientSettings, FetchError, SpyglassApi};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{alerts, asins, dashboard, groups};

// ============================================================================
// CLI Definition
// ============================================================================

/// Spyglass CLI - listing monitor dashboard.
#[derive(Parser)]
#[command(name = "spyglass")]
#[command(about = "E-commerce listing monitor dashboard")]
#[command(long_about = r#"
Spyglass shows monitored product listings, their history, and the alerts
raised for them (price, inventory, content and review changes).

Configuration comes from the environment:
  SPYGLASS_API_BASE_URL      API base URL or path (default /api)
  SPYGLASS_PAGE_ORIGIN       Origin relative URLs are resolved against
  SPYGLASS_API_TIMEOUT_MS    Per-attempt timeout (default 10000)
  SPYGLASS_API_RETRY         Retries after the first attempt (default 2)
  SPYGLASS_API_CACHE_TTL_MS  GET cache lifetime (default 30000)

Examples:
  spyglass                       # Dashboard
  spyglass asins show 42         # One listing in detail
  spyglass alerts --type TITLE   # Title change alerts
  spyglass --format json groups  # Groups as JSON
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, shows the dashboard.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// API base URL; overrides SPYGLASS_API_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Page origin; overrides SPYGLASS_PAGE_ORIGIN.
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt.
    #[arg(long, global = true)]
    pub retry: Option<u32>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Listings with alert counts (default if no command specified).
    #[command(visible_alias = "d")]
    Dashboard(dashboard::DashboardArgs),

    /// Monitored listings.
    #[command(visible_alias = "a")]
    Asins(asins::AsinsArgs),

    /// Alert log.
    #[command(visible_alias = "al")]
    Alerts(alerts::AlertsArgs),

    /// Listing groups.
    #[command(visible_alias = "g")]
    Groups(groups::GroupsArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The requested resource does not exist.
    NotFound = 2,
    /// Bad configuration or request.
    InvalidInput = 3,
    /// Timeout.
    Timeout = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FetchError>() {
            Some(e) if e.is_timeout() => Self::Timeout,
            Some(e) if e.status() == Some(404) => Self::NotFound,
            Some(FetchError::InvalidConfig(_) | FetchError::InvalidRequest(_)) => Self::InvalidInput,
            _ => Self::Error,
        }
    }
}

impl Cli {
    /// Builds the API from the environment plus command-line overrides.
    pub fn api(&self) -> Result<SpyglassApi> {
        let mut settings = ClientSettings::from_env()?;
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.trim());
        }
        if let Some(origin) = &self.origin {
            settings = settings.with_page_origin(origin.trim());
        }
        if let Some(ms) = self.timeout_ms.filter(|ms| *ms > 0) {
            settings = settings.with_timeout(Duration::from_millis(ms));
        }
        if let Some(retry) = self.retry {
            settings = settings.with_retry_limit(retry);
        }
        Ok(SpyglassApi::new(ApiClient::new(settings)?))
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("spyglass=debug,spyglass_fetch=debug,spyglass_core=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spyglass_fetch=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Dashboard(args)) => dashboard::run(args, &cli).await,
        Some(Commands::Asins(args)) => asins::run(args, &cli).await,
        Some(Commands::Alerts(args)) => alerts::run(args, &cli).await,
        Some(Commands::Groups(args)) => groups::run(args, &cli).await,
        None => dashboard::run(&dashboard::DashboardArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults_to_dashboard() {
        let cli = Cli::try_parse_from(["spyglass"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["spyglass", "alerts", "--format", "json", "--retry", "0"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.retry, Some(0));
        assert!(matches!(cli.command, Some(Commands::Alerts(_))));
    }

    #[test]
    fn test_exit_codes() {
        let timeout = anyhow::Error::new(FetchError::Timeout {
            url: "/api/asin".into(),
            timeout: Duration::from_secs(10),
        });
        assert_eq!(ExitCode::for_error(&timeout), ExitCode::Timeout);

        let missing = anyhow::Error::new(FetchError::Api {
            status: 404,
            body: String::new(),
        });
        assert_eq!(ExitCode::for_error(&missing), ExitCode::NotFound);

        let config = anyhow::Error::new(FetchError::InvalidConfig("x".into()));
        assert_eq!(ExitCode::for_error(&config), ExitCode::InvalidInput);

        assert_eq!(ExitCode::for_error(&anyhow::anyhow!("boom")), ExitCode::Error);
        assert_eq!(ExitCode::Success as i32, 0);
    }
}
