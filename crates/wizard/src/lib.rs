//! `ecert-wizard`: the multi-step form flow that creates and edits
//! applications and hands finished records to the listing.

pub mod controller;
pub mod error;

pub use controller::{MAX_ID_ATTEMPTS, WizardController};
pub use ecert_application::{NavigationPolicy, Step};
pub use error::{WizardError, WizardResult};
