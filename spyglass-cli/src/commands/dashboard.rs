//! Dashboard command - listings with their recent alert counts.

use anyhow::Result;
use spyglass_core::{map_alert, map_asin};
use spyglass_fetch::AlertQuery;
use tracing::{info, warn};

use super::PageArgs;
use crate::output::{DashboardView, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// How many recent alerts are pulled to compute per-listing counts.
const RECENT_ALERTS: u32 = 200;

/// Arguments for the dashboard command.
#[derive(clap::Args, Debug, Default)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub paging: PageArgs,

    /// Only listings in this group.
    #[arg(long, short)]
    pub group: Option<i64>,
}

/// Runs the dashboard command.
pub async fn run(args: &DashboardArgs, cli: &Cli) -> Result<()> {
    info!(page = args.paging.page, "Loading dashboard");
    let api = cli.api()?;

    let recent = AlertQuery::new(0, RECENT_ALERTS);
    let (listings, alerts) = futures::join!(
        api.list_asins(args.paging.index(), args.paging.size, args.group),
        api.list_alerts(&recent)
    );

    let listings = listings?.map(|record| map_asin(&record));
    let alerts = alerts
        .map(|page| page.items.iter().map(map_alert).collect())
        .map_err(|e| {
            warn!(error = %e, "Alert counts unavailable");
            e.to_string()
        });
    let view = DashboardView::build(listings, alerts);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_dashboard(&view));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_dashboard(&view)?);
        }
    }

    Ok(())
}
