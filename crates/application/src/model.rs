//! Application record: enumerations and sub-records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use ecert_core::EnglishText;

/// Certificate application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationType {
    /// P.Q. 7
    #[serde(rename = "PQ7")]
    Export,
    /// P.Q. 8
    #[serde(rename = "PQ8")]
    ReExport,
    /// P.Q. 9
    #[serde(rename = "PQ9")]
    Replacement,
    /// P.Q. 13
    #[serde(rename = "PQ13")]
    ExporterRegistration,
}

impl ApplicationType {
    pub const ALL: [ApplicationType; 4] = [
        ApplicationType::Export,
        ApplicationType::ReExport,
        ApplicationType::Replacement,
        ApplicationType::ExporterRegistration,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ApplicationType::Export => "PQ7",
            ApplicationType::ReExport => "PQ8",
            ApplicationType::Replacement => "PQ9",
            ApplicationType::ExporterRegistration => "PQ13",
        }
    }

    /// Prefix used when generating application ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ApplicationType::Export => "APP",
            ApplicationType::ReExport => "REX",
            ApplicationType::Replacement => "REP",
            ApplicationType::ExporterRegistration => "REG",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationType::Export => "P.Q. 7 (Export)",
            ApplicationType::ReExport => "P.Q. 8 (Re-export)",
            ApplicationType::Replacement => "P.Q. 9 (Replacement)",
            ApplicationType::ExporterRegistration => "P.Q. 13 (Registration)",
        }
    }
}

impl core::fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Application status lifecycle.
///
/// ```text
/// New -> WaitingDocumentCheck -> WaitingInspection -> WaitingPayment -> Approved
///   \______________________\__________________\______________\--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Waiting for Document Check")]
    WaitingDocumentCheck,
    #[serde(rename = "Waiting for Inspection")]
    WaitingInspection,
    #[serde(rename = "Waiting for Payment")]
    WaitingPayment,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::New,
        ApplicationStatus::WaitingDocumentCheck,
        ApplicationStatus::WaitingInspection,
        ApplicationStatus::WaitingPayment,
        ApplicationStatus::Approved,
        ApplicationStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::WaitingDocumentCheck => "Waiting for Document Check",
            ApplicationStatus::WaitingInspection => "Waiting for Inspection",
            ApplicationStatus::WaitingPayment => "Waiting for Payment",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Cancelled)
    }

    /// The status that follows this one on the happy path.
    pub fn successor(self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::New => Some(ApplicationStatus::WaitingDocumentCheck),
            ApplicationStatus::WaitingDocumentCheck => Some(ApplicationStatus::WaitingInspection),
            ApplicationStatus::WaitingInspection => Some(ApplicationStatus::WaitingPayment),
            ApplicationStatus::WaitingPayment => Some(ApplicationStatus::Approved),
            ApplicationStatus::Approved | ApplicationStatus::Cancelled => None,
        }
    }

    /// Whether `next` is a legal transition from `self`.
    ///
    /// Re-saving a draft (`New -> New`) is allowed; everything else must move
    /// one step forward or cancel a non-terminal application.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        if self == ApplicationStatus::New && next == ApplicationStatus::New {
            return true;
        }
        if next == ApplicationStatus::Cancelled {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a replacement (P.Q. 9) certificate is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementReason {
    Lost,
    Error,
    Correction,
    Damaged,
}

impl ReplacementReason {
    /// Reference list, in form order.
    pub const ALL: [ReplacementReason; 4] = [
        ReplacementReason::Lost,
        ReplacementReason::Error,
        ReplacementReason::Correction,
        ReplacementReason::Damaged,
    ];

    pub fn description(self) -> &'static str {
        match self {
            ReplacementReason::Lost => "Original Certificate Lost",
            ReplacementReason::Error => "Data Entry Error (Typo)",
            ReplacementReason::Correction => "Consignee Address Correction",
            ReplacementReason::Damaged => "Original Certificate Damaged",
        }
    }
}

impl core::str::FromStr for ReplacementReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lost" => Ok(ReplacementReason::Lost),
            "Error" => Ok(ReplacementReason::Error),
            "Correction" => Ok(ReplacementReason::Correction),
            "Damaged" => Ok(ReplacementReason::Damaged),
            other => Err(format!("unknown replacement reason '{other}'")),
        }
    }
}

/// Exporter identity as provisioned by the surrounding system (SSO profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExporterProfile {
    pub tax_id: String,
    pub name: String,
    pub address: String,
}

impl Default for ExporterProfile {
    fn default() -> Self {
        Self {
            tax_id: "1234567890123".to_string(),
            name: "Thai Exports Co., Ltd.".to_string(),
            address: "123 Sukhumvit Rd, Khlong Toei, Bangkok 10110, Thailand".to_string(),
        }
    }
}

/// Step 1: exporter, with an optional on-behalf-of representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exporter {
    pub tax_id: String,
    pub name: String,
    pub address: String,
    pub is_on_behalf_of: bool,
    #[serde(default)]
    pub ob_name: EnglishText,
    #[serde(default)]
    pub ob_address: EnglishText,
}

/// Active representative, present only while `is_on_behalf_of` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Representative<'a> {
    pub name: &'a EnglishText,
    pub address: &'a EnglishText,
}

impl Exporter {
    pub fn from_profile(profile: &ExporterProfile) -> Self {
        Self {
            tax_id: profile.tax_id.clone(),
            name: profile.name.clone(),
            address: profile.address.clone(),
            is_on_behalf_of: false,
            ob_name: EnglishText::default(),
            ob_address: EnglishText::default(),
        }
    }

    pub fn representative(&self) -> Option<Representative<'_>> {
        self.is_on_behalf_of.then_some(Representative {
            name: &self.ob_name,
            address: &self.ob_address,
        })
    }
}

/// Step 2: receiving party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consignee {
    pub tax_id: String,
    pub branch: String,
    pub company_name: EnglishText,
    pub address: EnglishText,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

/// Re-export (P.Q. 8) provenance of the goods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReExportOrigin {
    pub origin_country: String,
    #[serde(rename = "originalPCNumber")]
    pub original_pc_number: String,
    pub entry_date_to_thailand: Option<NaiveDate>,
}

/// Step 3: shipment header and manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub transport_means: String,
    pub vehicle_info: String,
    pub export_date: Option<NaiveDate>,
    pub bl_awb_number: String,
    pub gross_weight: f64,
    pub total_packages: u32,
    pub package_unit: String,
    pub destination_country: String,
    pub port_of_entry: String,
    pub transit_ports: Vec<String>,
    pub shipping_marks: Vec<String>,
    pub items: Vec<crate::item::Item>,
    pub total_net_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_export: Option<ReExportOrigin>,
}

/// Replacement (P.Q. 9) details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementDetails {
    pub original_certificate_id: String,
    pub replacement_reason: Option<ReplacementReason>,
    pub replacement_fee: f64,
}

/// Step 4: issuing station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuance {
    /// Empty until a station is chosen.
    pub station_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionMode {
    #[default]
    Checkpoint,
    #[serde(rename = "Off-site")]
    OffSite,
}

impl core::str::FromStr for InspectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Checkpoint" => Ok(InspectionMode::Checkpoint),
            "Off-site" | "OffSite" => Ok(InspectionMode::OffSite),
            other => Err(format!("unknown inspection mode '{other}'")),
        }
    }
}

/// Site details for an off-site inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffSiteDetails {
    pub contact_person: String,
    pub third_party_company_id: String,
    pub site_name: String,
    pub latitude: String,
    pub longitude: String,
    pub site_address: String,
}

/// Step 5: inspection appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    #[serde(rename = "type")]
    pub mode: InspectionMode,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    #[serde(default)]
    pub off_site: OffSiteDetails,
}

impl Inspection {
    /// Off-site details, present only when the mode is off-site.
    pub fn off_site(&self) -> Option<&OffSiteDetails> {
        (self.mode == InspectionMode::OffSite).then_some(&self.off_site)
    }
}
