//! Listing commands - list, show, add, update, configure, remove.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use spyglass_core::{
    CreateAsinRequest, MonitorConfig, UpdateAsinRequest, map_alert, map_asin, map_history_point,
    map_review,
};
use spyglass_fetch::{AlertQuery, HistoryRange, SpyglassApi};
use tracing::info;

use super::PageArgs;
use crate::output::{DetailView, JsonFormatter, Section, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the asins command.
#[derive(Args, Debug)]
pub struct AsinsArgs {
    #[command(subcommand)]
    pub command: Option<AsinCommand>,
}

/// Listing subcommands.
#[derive(Subcommand, Debug)]
pub enum AsinCommand {
    /// List monitored listings (default).
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one listing with history, alerts, and negative reviews.
    Show(ShowArgs),

    /// Start monitoring a listing.
    Add(AddArgs),

    /// Change nickname, group, or brand.
    Update(UpdateArgs),

    /// Change alert thresholds and switches.
    Config(ConfigArgs),

    /// Stop monitoring a listing.
    #[command(visible_alias = "rm")]
    Remove {
        /// Listing id.
        id: i64,
    },
}

/// Arguments for `asins list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub paging: PageArgs,

    /// Only listings in this group.
    #[arg(long, short)]
    pub group: Option<i64>,
}

/// Arguments for `asins show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Listing id.
    pub id: i64,

    /// History range: 7d, 30d or 90d.
    #[arg(long, short, default_value = "30d")]
    pub range: HistoryRange,

    /// Rows per section.
    #[arg(long, short = 'n', default_value_t = 10)]
    pub size: u32,

    /// History points to fetch.
    #[arg(long, default_value_t = 500)]
    pub history_size: u32,
}

/// Arguments for `asins add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// ASIN code.
    pub asin: String,

    /// Marketplace code (US, UK, DE, JP, ...).
    #[arg(long, short, default_value = "US")]
    pub site: String,

    /// Nickname.
    #[arg(long)]
    pub nickname: Option<String>,

    /// Group id.
    #[arg(long, short)]
    pub group: Option<i64>,

    /// Brand name.
    #[arg(long)]
    pub brand: Option<String>,
}

/// Arguments for `asins update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Listing id.
    pub id: i64,

    /// New nickname.
    #[arg(long)]
    pub nickname: Option<String>,

    /// New group id.
    #[arg(long, short)]
    pub group: Option<i64>,

    /// New brand.
    #[arg(long)]
    pub brand: Option<String>,
}

/// Arguments for `asins config`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Listing id.
    pub id: i64,

    /// Alert when price moves by this many percent.
    #[arg(long)]
    pub price_threshold: Option<f64>,

    /// Alert when best-seller rank moves by this many percent.
    #[arg(long)]
    pub bsr_threshold: Option<f64>,

    /// Alert when inventory drops below this count.
    #[arg(long)]
    pub inventory_threshold: Option<i64>,

    /// Alert on reviews at or below this star rating.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub negative_rating: Option<u8>,

    /// Turn title, image, bullet point, and A+ content alerts on or off.
    #[arg(long)]
    pub content_alerts: Option<bool>,
}

impl ConfigArgs {
    /// Builds the configuration body. Setting a threshold enables its alert.
    pub fn to_config(&self) -> MonitorConfig {
        MonitorConfig {
            enable_price_alert: self.price_threshold.map(|_| true),
            price_change_threshold: self.price_threshold,
            enable_bsr_alert: self.bsr_threshold.map(|_| true),
            bsr_change_threshold: self.bsr_threshold,
            enable_inventory_alert: self.inventory_threshold.map(|_| true),
            inventory_threshold: self.inventory_threshold,
            enable_negative_review_alert: self.negative_rating.map(|_| true),
            negative_review_rating_threshold: self.negative_rating,
            enable_title_change_alert: self.content_alerts,
            enable_main_image_change_alert: self.content_alerts,
            enable_bullet_points_change_alert: self.content_alerts,
            enable_aplus_content_change_alert: self.content_alerts,
            ..MonitorConfig::default()
        }
    }
}

/// Runs the asins command.
pub async fn run(args: &AsinsArgs, cli: &Cli) -> Result<()> {
    let api = cli.api()?;

    match &args.command {
        None => list(&api, &ListArgs::default(), cli).await,
        Some(AsinCommand::List(list_args)) => list(&api, list_args, cli).await,
        Some(AsinCommand::Show(show_args)) => show(&api, show_args, cli).await,
        Some(AsinCommand::Add(add_args)) => {
            let body = CreateAsinRequest {
                nickname: add_args.nickname.clone(),
                group_id: add_args.group,
                brand: add_args.brand.clone(),
                ..CreateAsinRequest::new(add_args.asin.trim(), add_args.site.trim())
            };
            let created = api.create_asin(&body).await?;
            let item = map_asin(&created);
            report(cli, "created", item.id, Some(&item), &format!(
                "Monitoring {} ({}) as #{}",
                item.asin, item.site, item.id
            ))
        }
        Some(AsinCommand::Update(update_args)) => {
            let body = UpdateAsinRequest {
                nickname: update_args.nickname.clone(),
                group_id: update_args.group,
                brand: update_args.brand.clone(),
                monitor_config: None,
            };
            if body == UpdateAsinRequest::default() {
                bail!("Nothing to update; pass --nickname, --group or --brand");
            }
            let updated = api.update_asin(update_args.id, &body).await?;
            let item = map_asin(&updated);
            report(cli, "updated", item.id, Some(&item), &format!("Updated #{}", item.id))
        }
        Some(AsinCommand::Config(config_args)) => {
            let config = config_args.to_config();
            if config == MonitorConfig::default() {
                bail!("Nothing to configure; pass at least one threshold or --content-alerts");
            }
            let updated = api.update_asin_config(config_args.id, &config).await?;
            let item = map_asin(&updated);
            report(cli, "configured", item.id, Some(&item), &format!(
                "Updated alert settings for #{}",
                item.id
            ))
        }
        Some(AsinCommand::Remove { id }) => {
            api.delete_asin(*id).await?;
            report::<()>(cli, "deleted", *id, None, &format!("Stopped monitoring #{id}"))
        }
    }
}

async fn list(api: &SpyglassApi, args: &ListArgs, cli: &Cli) -> Result<()> {
    let page = api
        .list_asins(args.paging.index(), args.paging.size, args.group)
        .await?
        .map(|record| map_asin(&record));

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_asins(&page)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format_page(&page)?),
    }
    Ok(())
}

async fn show(api: &SpyglassApi, args: &ShowArgs, cli: &Cli) -> Result<()> {
    info!(id = args.id, range = %args.range, "Loading listing detail");

    let alert_query = AlertQuery::new(0, args.size);
    let (detail, history, alerts, reviews) = futures::join!(
        api.asin_detail(args.id),
        api.asin_history(args.id, args.range, 0, args.history_size),
        api.asin_alerts(args.id, &alert_query),
        api.negative_reviews(args.id, 0, args.size)
    );

    let view = DetailView {
        listing: map_asin(&detail?),
        range: args.range.to_string(),
        history: Section::from_result(
            history.map(|page| page.items.iter().map(map_history_point).collect()),
        ),
        alerts: Section::from_result(alerts.map(|page| page.map(|record| map_alert(&record)))),
        reviews: Section::from_result(reviews.map(|page| page.map(|record| map_review(&record)))),
    };

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_detail(&view)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format_detail(&view)?),
    }
    Ok(())
}

/// Prints the outcome of a write command.
pub(crate) fn report<T: serde::Serialize>(
    cli: &Cli,
    action: &str,
    id: i64,
    record: Option<&T>,
    message: &str,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", TextFormatter::new(!cli.no_color).format_action(message));
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                JsonFormatter::new(cli.pretty).format_action(action, Some(id), record)?
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_enable_their_alerts() {
        let args = ConfigArgs {
            id: 1,
            price_threshold: Some(5.0),
            negative_rating: Some(2),
            ..ConfigArgs::default()
        };
        let config = args.to_config();

        assert_eq!(config.enable_price_alert, Some(true));
        assert_eq!(config.price_change_threshold, Some(5.0));
        assert_eq!(config.enable_negative_review_alert, Some(true));
        assert_eq!(config.negative_review_rating_threshold, Some(2));
        assert_eq!(config.enable_bsr_alert, None);
        assert_eq!(config.enable_title_change_alert, None);
    }

    #[test]
    fn test_content_alerts_switch_all_content_kinds() {
        let args = ConfigArgs {
            id: 1,
            content_alerts: Some(false),
            ..ConfigArgs::default()
        };
        let config = args.to_config();

        assert_eq!(config.enable_title_change_alert, Some(false));
        assert_eq!(config.enable_main_image_change_alert, Some(false));
        assert_eq!(config.enable_bullet_points_change_alert, Some(false));
        assert_eq!(config.enable_aplus_content_change_alert, Some(false));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ConfigArgs::default().to_config(), MonitorConfig::default());
    }
}
