//! `ecert-application`: the application record, its aggregate, the item
//! composer, validation and the snapshot store.

pub mod application;
pub mod compose;
pub mod field;
pub mod item;
pub mod model;
pub mod store;
pub mod validation;

pub use application::{
    Application, ApplicationCommand, ApplicationDefaults, ApplicationEvent, CreateApplication,
    DEFAULT_REPLACEMENT_FEE_THB,
};
pub use compose::{ItemComposer, ItemDetails};
pub use field::{
    ConsigneeField, ExporterField, FieldUpdate, InspectionField, IssuanceField, ReplacementField,
    ShipmentField,
};
pub use item::{Item, ItemPurpose, PackageLayer};
pub use model::{
    ApplicationStatus, ApplicationType, Consignee, Exporter, ExporterProfile, Inspection,
    InspectionMode, Issuance, OffSiteDetails, ReExportOrigin, ReplacementDetails,
    ReplacementReason, Shipment,
};
pub use store::ApplicationStore;
pub use validation::{
    FieldIssue, NavigationPolicy, Step, WeightMismatch, english_issues, step_issues, weight_mismatch,
    weight_reconciles,
};
