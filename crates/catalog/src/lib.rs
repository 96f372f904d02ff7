//! Plant product catalog and reference data (read-only).
//!
//! Nothing here mutates: products and reference lists are fixed for the life
//! of the process.

pub mod product;
pub mod reference;

pub use product::{CatalogProvider, InMemoryCatalog, PlantProduct, ProductId};
pub use reference::{
    COUNTRIES, PACKAGE_UNITS, QUARANTINE_STATIONS, QuarantineStation, ReferenceData,
    TRANSPORT_MEANS,
};
