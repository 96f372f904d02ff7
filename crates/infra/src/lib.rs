//! Infrastructure layer: configuration, the listing read model, the
//! dashboard projection and seed data.

pub mod config;
pub mod read_model;
pub mod seed;

pub use config::{AppConfig, ConfigError};
pub use read_model::{
    DashboardRow, DashboardSummary, InMemoryListing, ListingError, ListingService, Upsert,
};
