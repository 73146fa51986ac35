//! Alerts command - the alert log, globally or for one listing.

use anyhow::Result;
use spyglass_core::{AlertKind, map_alert};
use spyglass_fetch::AlertQuery;
use tracing::{debug, warn};

use super::PageArgs;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the alerts command.
#[derive(clap::Args, Debug, Default)]
pub struct AlertsArgs {
    #[command(flatten)]
    pub paging: PageArgs,

    /// Alert type code, e.g. PRICE_CHANGE or NEGATIVE_REVIEW.
    #[arg(long = "type", short = 't')]
    pub alert_type: Option<String>,

    /// Only alerts for this listing id.
    #[arg(long, short)]
    pub asin: Option<i64>,

    /// Only alerts at or after this time.
    #[arg(long)]
    pub from: Option<String>,

    /// Only alerts at or before this time.
    #[arg(long)]
    pub to: Option<String>,
}

impl AlertsArgs {
    /// Builds the backend query.
    pub fn query(&self) -> AlertQuery {
        let mut query = AlertQuery::new(self.paging.index(), self.paging.size)
            .between(self.from.clone(), self.to.clone());
        if let Some(code) = &self.alert_type {
            let code = code.trim().to_ascii_uppercase();
            if AlertKind::from_code(&code).is_none() {
                // Unknown codes are still sent; the backend may know newer ones.
                warn!(code = %code, "Unknown alert type");
            }
            query = query.with_type(code);
        }
        query
    }
}

/// Runs the alerts command.
pub async fn run(args: &AlertsArgs, cli: &Cli) -> Result<()> {
    let api = cli.api()?;
    let query = args.query();
    debug!(?query, asin = ?args.asin, "Fetching alerts");

    let page = match args.asin {
        Some(id) => api.asin_alerts(id, &query).await?,
        None => api.list_alerts(&query).await?,
    }
    .map(|record| map_alert(&record));

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_alerts(&page)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format_page(&page)?),
    }
    Ok(())
}
