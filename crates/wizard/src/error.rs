use thiserror::Error;

use ecert_application::{ApplicationStatus, FieldIssue, Step};
use ecert_core::{ApplicationId, DomainError};
use ecert_infra::ListingError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    #[error("wizard is closed")]
    Closed,

    #[error("total net weight {declared:.2} kg does not match itemized sum {itemized:.2} kg")]
    WeightMismatch { declared: f64, itemized: f64 },

    #[error("fields contain characters outside the English set: {}", fields.join(", "))]
    NonEnglishText { fields: Vec<String> },

    #[error("{step} is incomplete ({} issue(s))", issues.len())]
    IncompleteStep { step: Step, issues: Vec<FieldIssue> },

    #[error("final submission is only possible from the last step (currently on {step})")]
    NotOnFinalStep { step: Step },

    #[error("application {0} not found")]
    NotFound(ApplicationId),

    #[error("application {id} cannot be edited (status: {status})")]
    NotEditable {
        id: ApplicationId,
        status: ApplicationStatus,
    },

    #[error("no unused {prefix} id found after {attempts} attempts")]
    IdSpaceExhausted { prefix: &'static str, attempts: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

pub type WizardResult<T> = Result<T, WizardError>;
