//! CLI command implementations.

pub mod alerts;
pub mod asins;
pub mod dashboard;
pub mod groups;

use clap::Args;

/// Paging flags shared by list commands. Pages are one-based here and
/// converted to the backend's zero-based pages on the way out.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Page number, starting at 1.
    #[arg(long, short = 'p', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Items per page.
    #[arg(long, short = 'n', default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub size: u32,
}

impl PageArgs {
    /// Zero-based page index.
    pub fn index(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

impl Default for PageArgs {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}
