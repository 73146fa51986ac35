//! Groups command - list and manage listing groups.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use spyglass_core::CreateGroupRequest;
use spyglass_fetch::api::DEFAULT_GROUP_PAGE_SIZE;

use super::asins::report;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the groups command.
#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: Option<GroupCommand>,
}

/// Group subcommands.
#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// List groups (default).
    #[command(visible_alias = "ls")]
    List {
        /// Page number, starting at 1.
        #[arg(long, short = 'p', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Groups per page.
        #[arg(long, short = 'n', default_value_t = DEFAULT_GROUP_PAGE_SIZE)]
        size: u32,
    },

    /// Create a group.
    Add {
        /// Group name.
        name: String,

        /// Description.
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Rename a group or change its description.
    Update {
        /// Group id.
        id: i64,

        /// New name.
        name: String,

        /// New description.
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete a group.
    #[command(visible_alias = "rm")]
    Remove {
        /// Group id.
        id: i64,
    },
}

fn group_body(name: &str, description: Option<&String>) -> Result<CreateGroupRequest> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Group name must not be empty");
    }
    Ok(CreateGroupRequest {
        name: name.to_string(),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}

/// Runs the groups command.
pub async fn run(args: &GroupsArgs, cli: &Cli) -> Result<()> {
    let api = cli.api()?;

    match &args.command {
        None => list(&api, 1, DEFAULT_GROUP_PAGE_SIZE, cli).await,
        Some(GroupCommand::List { page, size }) => list(&api, *page, *size, cli).await,
        Some(GroupCommand::Add { name, description }) => {
            let created = api.create_group(&group_body(name, description.as_ref())?).await?;
            report(cli, "created", created.id, Some(&created), &format!(
                "Created group #{} ({})",
                created.id, created.name
            ))
        }
        Some(GroupCommand::Update { id, name, description }) => {
            let updated = api
                .update_group(*id, &group_body(name, description.as_ref())?)
                .await?;
            report(cli, "updated", updated.id, Some(&updated), &format!(
                "Updated group #{}",
                updated.id
            ))
        }
        Some(GroupCommand::Remove { id }) => {
            api.delete_group(*id).await?;
            report::<()>(cli, "deleted", *id, None, &format!("Deleted group #{id}"))
        }
    }
}

async fn list(api: &spyglass_fetch::SpyglassApi, page: u32, size: u32, cli: &Cli) -> Result<()> {
    let groups = api.list_groups(page.saturating_sub(1), size).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_groups(&groups)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format_page(&groups)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_body_trims() {
        let description = "  Kitchen gadgets ".to_string();
        let body = group_body(" Kitchen ", Some(&description)).unwrap();
        assert_eq!(body.name, "Kitchen");
        assert_eq!(body.description.as_deref(), Some("Kitchen gadgets"));
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let blank = "   ".to_string();
        let body = group_body("Lamps", Some(&blank)).unwrap();
        assert!(body.description.is_none());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(group_body("  ", None).is_err());
    }
}
