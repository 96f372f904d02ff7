//! Pure validation predicates over an application snapshot.
//!
//! Nothing here mutates or blocks on its own; callers (the aggregate and the
//! wizard) decide what a failed check means.

use serde::{Deserialize, Serialize};

use ecert_catalog::ReferenceData;

use crate::application::Application;
use crate::item::Item;
use crate::model::{ApplicationType, InspectionMode, Shipment};

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Unrounded sum of item net weights.
pub fn itemized_net_weight(items: &[Item]) -> f64 {
    items.iter().map(Item::net_weight).sum()
}

/// Declared and itemized totals that failed to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightMismatch {
    pub declared: f64,
    /// Already rounded to two decimals.
    pub itemized: f64,
}

/// `None` when the manifest is empty or the rounded item sum equals the
/// declared total exactly.
pub fn shipment_weight_mismatch(shipment: &Shipment) -> Option<WeightMismatch> {
    if shipment.items.is_empty() {
        return None;
    }
    let itemized = round2(itemized_net_weight(&shipment.items));
    (itemized != shipment.total_net_weight).then_some(WeightMismatch {
        declared: shipment.total_net_weight,
        itemized,
    })
}

pub fn weight_mismatch(app: &Application) -> Option<WeightMismatch> {
    shipment_weight_mismatch(app.shipment())
}

pub fn weight_reconciles(app: &Application) -> bool {
    weight_mismatch(app).is_none()
}

/// The five wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Exporter,
    Consignee,
    ShipmentAndItems,
    Issuance,
    Inspection,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Exporter,
        Step::Consignee,
        Step::ShipmentAndItems,
        Step::Issuance,
        Step::Inspection,
    ];

    pub const FIRST: Step = Step::Exporter;
    pub const LAST: Step = Step::Inspection;

    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Step::Exporter => 1,
            Step::Consignee => 2,
            Step::ShipmentAndItems => 3,
            Step::Issuance => 4,
            Step::Inspection => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Exporter => "Exporter",
            Step::Consignee => "Consignee",
            Step::ShipmentAndItems => "Shipment & Items",
            Step::Issuance => "Issuance",
            Step::Inspection => "Inspection",
        }
    }

    /// Next step, clamped at the last one.
    pub fn next(self) -> Step {
        Step::from_number(self.number() + 1).unwrap_or(Step::LAST)
    }

    /// Previous step, clamped at the first one.
    pub fn prev(self) -> Step {
        Step::from_number(self.number().saturating_sub(1)).unwrap_or(Step::FIRST)
    }
}

impl core::fmt::Display for Step {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

/// Whether forward navigation waits for earlier steps to be complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationPolicy {
    /// Any step can be reached at any time.
    #[default]
    Permissive,
    /// `next` and forward jumps are refused while an earlier step has issues.
    RequireCompleteSteps,
}

impl core::str::FromStr for NavigationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(NavigationPolicy::Permissive),
            "strict" | "require-complete-steps" => Ok(NavigationPolicy::RequireCompleteSteps),
            other => Err(format!(
                "unknown navigation policy '{other}' (expected permissive or strict)"
            )),
        }
    }
}

/// A field that needs attention before the step is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub step: Step,
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    fn new(step: Step, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Required-field checks for one step.
pub fn step_issues(app: &Application, step: Step, reference: &ReferenceData) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut require = |missing: bool, path: &str, message: &str| {
        if missing {
            issues.push(FieldIssue::new(step, path, message));
        }
    };

    match step {
        Step::Exporter => {
            if let Some(rep) = app.replacement() {
                require(
                    blank(&rep.original_certificate_id),
                    "originalCertificateId",
                    "original certificate number is required",
                );
                require(
                    rep.replacement_reason.is_none(),
                    "replacementReason",
                    "replacement reason is required",
                );
            }
            if let Some(rep) = app.exporter().representative() {
                require(rep.name.is_empty(), "exporter.obName", "representative name is required");
                require(
                    rep.address.is_empty(),
                    "exporter.obAddress",
                    "representative address is required",
                );
            }
        }
        Step::Consignee => {
            let consignee = app.consignee();
            require(
                consignee.company_name.is_empty(),
                "consignee.companyName",
                "company name is required",
            );
            require(consignee.address.is_empty(), "consignee.address", "address is required");
            if blank(&consignee.country) {
                require(true, "consignee.country", "country is required");
            } else {
                require(
                    !reference.is_country(&consignee.country),
                    "consignee.country",
                    "unknown country",
                );
            }
        }
        Step::ShipmentAndItems => {
            let shipment = app.shipment();
            if app.application_type() == ApplicationType::ReExport {
                let origin = shipment.re_export.clone().unwrap_or_default();
                require(
                    blank(&origin.origin_country),
                    "shipment.originCountry",
                    "origin country is required",
                );
                require(
                    !blank(&origin.origin_country) && !reference.is_country(&origin.origin_country),
                    "shipment.originCountry",
                    "unknown country",
                );
                require(
                    blank(&origin.original_pc_number),
                    "shipment.originalPCNumber",
                    "original PC number is required",
                );
                require(
                    origin.entry_date_to_thailand.is_none(),
                    "shipment.entryDateToThailand",
                    "entry date to Thailand is required",
                );
            }
            require(
                !blank(&shipment.transport_means)
                    && !reference.is_transport_means(&shipment.transport_means),
                "shipment.transportMeans",
                "unknown means of transport",
            );
            require(
                !blank(&shipment.package_unit) && !reference.is_package_unit(&shipment.package_unit),
                "shipment.packageUnit",
                "unknown package unit",
            );
            require(
                !blank(&shipment.destination_country)
                    && !reference.is_country(&shipment.destination_country),
                "shipment.destinationCountry",
                "unknown country",
            );
            require(shipment.items.is_empty(), "shipment.items", "add at least one item");
            require(
                shipment.total_net_weight <= 0.0,
                "shipment.totalNetWeight",
                "total net weight must be greater than zero",
            );
            if let Some(m) = shipment_weight_mismatch(shipment) {
                require(
                    true,
                    "shipment.totalNetWeight",
                    &format!(
                        "items sum to {:.2} kg but {:.2} kg is declared",
                        m.itemized, m.declared
                    ),
                );
            }
        }
        Step::Issuance => {
            let station_id = &app.issuance().station_id;
            if blank(station_id) {
                require(true, "issuance.stationId", "select an issuing station");
            } else {
                require(
                    reference.station(station_id).is_none(),
                    "issuance.stationId",
                    "unknown quarantine station",
                );
            }
        }
        Step::Inspection => {
            let inspection = app.inspection();
            require(
                inspection.appointment_date.is_none(),
                "inspection.appointmentDate",
                "appointment date is required",
            );
            require(
                inspection.appointment_time.is_none(),
                "inspection.appointmentTime",
                "appointment time is required",
            );
            if inspection.mode == InspectionMode::OffSite {
                let site = &inspection.off_site;
                require(
                    blank(&site.contact_person),
                    "inspection.contactPerson",
                    "contact person is required",
                );
                require(blank(&site.site_name), "inspection.siteName", "site name is required");
                require(
                    blank(&site.site_address),
                    "inspection.siteAddress",
                    "site address is required",
                );
            }
        }
    }

    issues
}

/// Issues for every step, in step order.
pub fn all_issues(app: &Application, reference: &ReferenceData) -> Vec<FieldIssue> {
    Step::ALL
        .into_iter()
        .flat_map(|step| step_issues(app, step, reference))
        .collect()
}

/// Scan every English-only field. Records that bypassed the input filter
/// (deserialized or seeded) are caught here before submission.
pub fn english_issues(app: &Application) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut check = |step: Step, path: String, valid: bool| {
        if !valid {
            issues.push(FieldIssue::new(
                step,
                path,
                "only A-Z, 0-9, spaces and . , # / - are allowed",
            ));
        }
    };

    if let Some(rep) = app.exporter().representative() {
        check(Step::Exporter, "exporter.obName".into(), rep.name.is_valid());
        check(Step::Exporter, "exporter.obAddress".into(), rep.address.is_valid());
    }
    let consignee = app.consignee();
    check(
        Step::Consignee,
        "consignee.companyName".into(),
        consignee.company_name.is_valid(),
    );
    check(Step::Consignee, "consignee.address".into(), consignee.address.is_valid());
    for (index, item) in app.shipment().items.iter().enumerate() {
        check(
            Step::ShipmentAndItems,
            format!("shipment.items[{index}].additionalDetails"),
            item.additional_details().is_valid(),
        );
    }

    issues
}
