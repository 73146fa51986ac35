//! Domain models for Spyglass.
//!
//! Raw records mirror the backend's camelCase JSON; display records are
//! what views render after the [`crate::mapping`] layer has run.
//!
//! ## Submodules
//!
//! - [`asin`] - Monitored listings and their write bodies
//! - [`alert`] - Alert log entries, alert kinds, change percentages
//! - [`review`] - Negative-review alerts
//! - [`history`] - Listing snapshots and chart points
//! - [`group`] - Listing groups

mod alert;
mod asin;
mod group;
mod history;
mod review;

// Re-export everything at the models level
pub use alert::{AlertItem, AlertKind, AlertRecord, PercentValue};
pub use asin::{AsinItem, AsinRecord, CreateAsinRequest, MonitorConfig, UpdateAsinRequest};
pub use group::{CreateGroupRequest, GroupRecord, UpdateGroupRequest};
pub use history::{HistoryPoint, HistoryRecord};
pub use review::{ReviewItem, ReviewRecord};
