//! Listing read model and the dashboard built on it.

pub mod dashboard;
pub mod listing;

pub use dashboard::{DashboardRow, DashboardSummary, render_table, rows, summary};
pub use listing::{InMemoryListing, ListingError, ListingService, Upsert};
