//! Text output formatting with tables, sparklines, and colors.

use chrono::{DateTime, Local};
use spyglass_core::{AlertItem, AsinItem, GroupRecord, HistoryPoint, PageEnvelope, ReviewItem};

use super::{DashboardView, DetailView, Section};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Sparkline levels, lowest first
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const STAR_FULL: char = '★';
const STAR_EMPTY: char = '☆';

const NONE: &str = "−";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    spark_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            spark_width: 24,
        }
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// Formats the dashboard.
    pub fn format_dashboard(&self, view: &DashboardView) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("Spyglass Dashboard"));
        lines.push("─".repeat(72));

        if view.rows.is_empty() {
            lines.push(self.dim("No monitored listings"));
        } else {
            lines.push(self.bold(&format!(
                "{:<6} {:<24} {:<4} {:>10} {:>9} {:>9} {:>7}",
                "ID", "Listing", "Site", "Price", "BSR", "Stock", "Alerts"
            )));
            for row in &view.rows {
                let alerts = match row.alert_count {
                    Some(0) => self.dim("0"),
                    Some(n) => self.red(&format!("● {n}")),
                    None => self.dim("?"),
                };
                let stock = self.stock(&row.listing, row.below_threshold);
                lines.push(format!(
                    "{:<6} {:<24} {:<4} {:>10} {:>9} {:>9} {:>7}",
                    row.listing.id,
                    truncate(&row.listing.display_name, 24),
                    row.listing.site,
                    format_price(row.listing.price),
                    format_optional(row.listing.bsr),
                    stock,
                    alerts
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.page_footer(view.page, view.total_pages, view.total));

        if let Some(err) = &view.alerts_error {
            lines.push(self.yellow(&format!("Alert counts unavailable: {err}")));
        }

        lines.join("\n")
    }

    /// Formats a page of listings.
    pub fn format_asins(&self, page: &PageEnvelope<AsinItem>) -> String {
        let mut lines = Vec::new();

        if page.items.is_empty() {
            lines.push(self.dim("No listings"));
        } else {
            lines.push(self.bold(&format!(
                "{:<6} {:<12} {:<4} {:<22} {:<14} {:>10} {:>9} {:>7}",
                "ID", "ASIN", "Site", "Name", "Group", "Price", "Stock", "Rating"
            )));
            for item in &page.items {
                lines.push(format!(
                    "{:<6} {:<12} {:<4} {:<22} {:<14} {:>10} {:>9} {:>7}",
                    item.id,
                    item.asin,
                    item.site,
                    truncate(&item.display_name, 22),
                    truncate(item.group_name.as_deref().unwrap_or(NONE), 14),
                    format_price(item.price),
                    self.stock(item, item.is_below_threshold()),
                    item.avg_rating.map_or_else(|| NONE.to_string(), |r| format!("{r:.1}"))
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.page_footer(page.page.saturating_add(1), page.total_pages, page.total));
        lines.join("\n")
    }

    /// Formats a page of alerts.
    pub fn format_alerts(&self, page: &PageEnvelope<AlertItem>) -> String {
        let mut lines = Vec::new();

        if page.items.is_empty() {
            lines.push(self.dim("No alerts"));
        } else {
            for alert in &page.items {
                lines.push(self.alert_line(alert));
            }
        }

        lines.push(String::new());
        lines.push(self.page_footer(page.page.saturating_add(1), page.total_pages, page.total));
        lines.join("\n")
    }

    /// Formats a page of groups.
    pub fn format_groups(&self, page: &PageEnvelope<GroupRecord>) -> String {
        let mut lines = Vec::new();

        if page.items.is_empty() {
            lines.push(self.dim("No groups"));
        } else {
            lines.push(self.bold(&format!(
                "{:<6} {:<20} {:>8}  {}",
                "ID", "Name", "Listings", "Description"
            )));
            for group in &page.items {
                lines.push(format!(
                    "{:<6} {:<20} {:>8}  {}",
                    group.id,
                    truncate(&group.name, 20),
                    format_optional(group.asin_count),
                    group.description.as_deref().unwrap_or("")
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.page_footer(page.page.saturating_add(1), page.total_pages, page.total));
        lines.join("\n")
    }

    /// Formats everything about one listing.
    pub fn format_detail(&self, view: &DetailView) -> String {
        let listing = &view.listing;
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&listing.display_name),
            self.dim(&format!("({} · {})", listing.asin, listing.site))
        ));
        lines.push("─".repeat(60));
        if let Some(brand) = &listing.brand {
            lines.push(format!("Brand:   {brand}"));
        }
        if let Some(group) = &listing.group_name {
            lines.push(format!("Group:   {group}"));
        }
        lines.push(format!("Price:   {}", format_price(listing.price)));
        lines.push(format!("BSR:     {}", format_optional(listing.bsr)));
        lines.push(format!(
            "Stock:   {}",
            self.stock(listing, listing.is_below_threshold())
        ));
        if let (Some(rating), Some(reviews)) = (listing.avg_rating, listing.total_reviews) {
            lines.push(format!("Rating:  {rating:.1} ({reviews} reviews)"));
        }

        lines.push(String::new());
        lines.push(self.bold(&format!("History ({})", view.range)));
        match &view.history {
            Section::Loaded(points) => lines.extend(self.history_lines(points)),
            Section::Failed(err) => lines.push(self.red(&format!("Failed to load: {err}"))),
        }

        lines.push(String::new());
        lines.push(self.bold("Alerts"));
        match &view.alerts {
            Section::Loaded(page) if page.items.is_empty() => lines.push(self.dim("No alerts")),
            Section::Loaded(page) => {
                lines.extend(page.items.iter().map(|a| self.alert_line(a)));
                if page.total > page.items.len() as u64 {
                    lines.push(self.dim(&format!("… {} total", page.total)));
                }
            }
            Section::Failed(err) => lines.push(self.red(&format!("Failed to load: {err}"))),
        }

        lines.push(String::new());
        lines.push(self.bold("Negative reviews"));
        match &view.reviews {
            Section::Loaded(page) if page.items.is_empty() => {
                lines.push(self.dim("No negative reviews"));
            }
            Section::Loaded(page) => lines.extend(page.items.iter().map(|r| self.review_line(r))),
            Section::Failed(err) => lines.push(self.red(&format!("Failed to load: {err}"))),
        }

        lines.join("\n")
    }

    /// Formats a one-line confirmation.
    pub fn format_action(&self, message: &str) -> String {
        format!("{} {message}", self.green("✓"))
    }

    // ========================================================================
    // Pieces
    // ========================================================================

    fn alert_line(&self, alert: &AlertItem) -> String {
        let when = format_timestamp(&alert.created_at);
        let change = alert
            .change_percent
            .as_deref()
            .map(|pct| {
                if pct.starts_with('-') {
                    self.red(pct)
                } else {
                    self.green(pct)
                }
            })
            .unwrap_or_default();

        format!(
            "{} {:<12} {:<20} {} {}",
            self.dim(&when),
            alert.asin,
            self.cyan(&alert.alert_type),
            alert.message,
            change
        )
        .trim_end()
        .to_string()
    }

    fn review_line(&self, review: &ReviewItem) -> String {
        format!(
            "{} {} {}",
            self.yellow(&format_rating(review.rating)),
            self.dim(&format_timestamp(&review.created_at)),
            truncate(&review.text, 80)
        )
    }

    fn history_lines(&self, points: &[HistoryPoint]) -> Vec<String> {
        if points.is_empty() {
            return vec![self.dim("No snapshots")];
        }

        let prices: Vec<f64> = points.iter().filter_map(|p| p.price).collect();
        let mut lines = vec![format!(
            "Price    {} {}",
            self.sparkline(&prices),
            self.dim(&price_range(&prices))
        )];

        #[allow(clippy::cast_precision_loss)]
        let stock: Vec<f64> = points.iter().filter_map(|p| p.inventory).map(|n| n as f64).collect();
        if !stock.is_empty() {
            lines.push(format!("Stock    {}", self.sparkline(&stock)));
        }

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            lines.push(self.dim(&format!(
                "{} snapshots, {} → {}",
                points.len(),
                format_timestamp(&first.timestamp),
                format_timestamp(&last.timestamp)
            )));
        }
        lines
    }

    /// Renders values as a sparkline, keeping the most recent points.
    pub fn sparkline(&self, values: &[f64]) -> String {
        let values = &values[values.len().saturating_sub(self.spark_width)..];
        if values.is_empty() {
            return NONE.to_string();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        values
            .iter()
            .map(|v| {
                if span <= f64::EPSILON {
                    return SPARKS[SPARKS.len() / 2];
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let level = (((v - min) / span) * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            })
            .collect()
    }

    fn stock(&self, item: &AsinItem, below_threshold: bool) -> String {
        let text = format_optional(item.inventory);
        if below_threshold {
            self.red(&text)
        } else {
            text
        }
    }

    fn page_footer(&self, page: u32, total_pages: u32, total: u64) -> String {
        self.dim(&format!(
            "Page {page}/{} · {total} total",
            total_pages.max(1)
        ))
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Plain helpers
// ============================================================================

/// Formats a price with two decimals.
pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| NONE.to_string(), |p| format!("{p:.2}"))
}

fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| NONE.to_string(), |v| v.to_string())
}

/// Renders a 1-5 star rating.
pub fn format_rating(rating: u8) -> String {
    let full = usize::from(rating.min(5));
    let mut stars = STAR_FULL.to_string().repeat(full);
    stars.push_str(&STAR_EMPTY.to_string().repeat(5 - full));
    stars
}

/// Shows RFC 3339 timestamps in local time; anything else verbatim.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn price_range(prices: &[f64]) -> String {
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if prices.is_empty() {
        String::new()
    } else if (max - min).abs() <= f64::EPSILON {
        format!("{min:.2}")
    } else {
        format!("{min:.2} – {max:.2}")
    }
}

/// Cuts `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// ============================================================================
// Tests
// ============================================================================
