//! Dashboard view models.
//!
//! Each submodule holds the static content of one dashboard page and the
//! small amount of filtering the page performs. Handlers in
//! [`crate::api::handlers::dashboard`] turn these into JSON documents.

/// Historical feed plans per cow and date.
pub mod history;
/// Marketplace listings and search.
pub mod marketplace;
/// Farm notifications feed.
pub mod notifications;

pub use history::{HistoricalFeedPlan, find_feed_plan};
pub use marketplace::{Listing, ListingFilter, ListingKind, search_listings};
pub use notifications::{Notification, NotificationKind, notifications, unread_count};
