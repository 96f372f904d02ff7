//! Typed field updates for the application record.
//!
//! Every editable leaf has a variant here. Identity, type, status, creation
//! date and the item list have none: they change only through dedicated
//! commands, if at all.
//!
//! [`FieldUpdate::from_path`] is the adapter for form bindings that address
//! fields by dot path (`consignee.companyName`) with a JSON value.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use ecert_core::{DomainError, DomainResult};

use crate::model::{InspectionMode, ReplacementReason};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExporterField {
    OnBehalfOf(bool),
    RepresentativeName(String),
    RepresentativeAddress(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsigneeField {
    TaxId(String),
    Branch(String),
    CompanyName(String),
    Address(String),
    Subdistrict(String),
    District(String),
    Province(String),
    Country(String),
    Phone(String),
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShipmentField {
    TransportMeans(String),
    VehicleInfo(String),
    ExportDate(Option<NaiveDate>),
    BlAwbNumber(String),
    GrossWeight(f64),
    TotalPackages(u32),
    PackageUnit(String),
    DestinationCountry(String),
    PortOfEntry(String),
    TransitPorts(Vec<String>),
    ShippingMarks(Vec<String>),
    TotalNetWeight(f64),
    // Re-export only.
    OriginCountry(String),
    OriginalPcNumber(String),
    EntryDateToThailand(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IssuanceField {
    StationId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InspectionField {
    Mode(InspectionMode),
    AppointmentDate(Option<NaiveDate>),
    AppointmentTime(Option<NaiveTime>),
    // Off-site only.
    ContactPerson(String),
    ThirdPartyCompanyId(String),
    SiteName(String),
    Latitude(String),
    Longitude(String),
    SiteAddress(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplacementField {
    OriginalCertificateId(String),
    Reason(Option<ReplacementReason>),
}

/// Replacement of exactly one leaf of the application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldUpdate {
    Exporter(ExporterField),
    Consignee(ConsigneeField),
    Shipment(ShipmentField),
    Issuance(IssuanceField),
    Inspection(InspectionField),
    Replacement(ReplacementField),
}

impl From<ExporterField> for FieldUpdate {
    fn from(value: ExporterField) -> Self {
        FieldUpdate::Exporter(value)
    }
}

impl From<ConsigneeField> for FieldUpdate {
    fn from(value: ConsigneeField) -> Self {
        FieldUpdate::Consignee(value)
    }
}

impl From<ShipmentField> for FieldUpdate {
    fn from(value: ShipmentField) -> Self {
        FieldUpdate::Shipment(value)
    }
}

impl From<IssuanceField> for FieldUpdate {
    fn from(value: IssuanceField) -> Self {
        FieldUpdate::Issuance(value)
    }
}

impl From<InspectionField> for FieldUpdate {
    fn from(value: InspectionField) -> Self {
        FieldUpdate::Inspection(value)
    }
}

impl From<ReplacementField> for FieldUpdate {
    fn from(value: ReplacementField) -> Self {
        FieldUpdate::Replacement(value)
    }
}

impl FieldUpdate {
    /// Dot path of the leaf this update replaces.
    pub fn path(&self) -> &'static str {
        match self {
            FieldUpdate::Exporter(f) => match f {
                ExporterField::OnBehalfOf(_) => "exporter.isOnBehalfOf",
                ExporterField::RepresentativeName(_) => "exporter.obName",
                ExporterField::RepresentativeAddress(_) => "exporter.obAddress",
            },
            FieldUpdate::Consignee(f) => match f {
                ConsigneeField::TaxId(_) => "consignee.taxId",
                ConsigneeField::Branch(_) => "consignee.branch",
                ConsigneeField::CompanyName(_) => "consignee.companyName",
                ConsigneeField::Address(_) => "consignee.address",
                ConsigneeField::Subdistrict(_) => "consignee.subdistrict",
                ConsigneeField::District(_) => "consignee.district",
                ConsigneeField::Province(_) => "consignee.province",
                ConsigneeField::Country(_) => "consignee.country",
                ConsigneeField::Phone(_) => "consignee.phone",
                ConsigneeField::Email(_) => "consignee.email",
            },
            FieldUpdate::Shipment(f) => match f {
                ShipmentField::TransportMeans(_) => "shipment.transportMeans",
                ShipmentField::VehicleInfo(_) => "shipment.vehicleInfo",
                ShipmentField::ExportDate(_) => "shipment.exportDate",
                ShipmentField::BlAwbNumber(_) => "shipment.blAwbNumber",
                ShipmentField::GrossWeight(_) => "shipment.grossWeight",
                ShipmentField::TotalPackages(_) => "shipment.totalPackages",
                ShipmentField::PackageUnit(_) => "shipment.packageUnit",
                ShipmentField::DestinationCountry(_) => "shipment.destinationCountry",
                ShipmentField::PortOfEntry(_) => "shipment.portOfEntry",
                ShipmentField::TransitPorts(_) => "shipment.transitPorts",
                ShipmentField::ShippingMarks(_) => "shipment.shippingMarks",
                ShipmentField::TotalNetWeight(_) => "shipment.totalNetWeight",
                ShipmentField::OriginCountry(_) => "shipment.originCountry",
                ShipmentField::OriginalPcNumber(_) => "shipment.originalPCNumber",
                ShipmentField::EntryDateToThailand(_) => "shipment.entryDateToThailand",
            },
            FieldUpdate::Issuance(IssuanceField::StationId(_)) => "issuance.stationId",
            FieldUpdate::Inspection(f) => match f {
                InspectionField::Mode(_) => "inspection.type",
                InspectionField::AppointmentDate(_) => "inspection.appointmentDate",
                InspectionField::AppointmentTime(_) => "inspection.appointmentTime",
                InspectionField::ContactPerson(_) => "inspection.contactPerson",
                InspectionField::ThirdPartyCompanyId(_) => "inspection.thirdPartyCompanyId",
                InspectionField::SiteName(_) => "inspection.siteName",
                InspectionField::Latitude(_) => "inspection.latitude",
                InspectionField::Longitude(_) => "inspection.longitude",
                InspectionField::SiteAddress(_) => "inspection.siteAddress",
            },
            FieldUpdate::Replacement(f) => match f {
                ReplacementField::OriginalCertificateId(_) => "originalCertificateId",
                ReplacementField::Reason(_) => "replacementReason",
            },
        }
    }

    /// Resolve a dot path and a JSON value into a typed update.
    ///
    /// Unknown paths (including read-only ones such as `id`, `status` or
    /// `shipment.items`) are `InvalidPath`; a value of the wrong shape is a
    /// `Validation` error.
    pub fn from_path(path: &str, value: &JsonValue) -> DomainResult<FieldUpdate> {
        let update: FieldUpdate = match path {
            "exporter.isOnBehalfOf" => ExporterField::OnBehalfOf(flag(path, value)?).into(),
            "exporter.obName" => ExporterField::RepresentativeName(text(path, value)?).into(),
            "exporter.obAddress" => ExporterField::RepresentativeAddress(text(path, value)?).into(),

            "consignee.taxId" => ConsigneeField::TaxId(text(path, value)?).into(),
            "consignee.branch" => ConsigneeField::Branch(text(path, value)?).into(),
            "consignee.companyName" => ConsigneeField::CompanyName(text(path, value)?).into(),
            "consignee.address" => ConsigneeField::Address(text(path, value)?).into(),
            "consignee.subdistrict" => ConsigneeField::Subdistrict(text(path, value)?).into(),
            "consignee.district" => ConsigneeField::District(text(path, value)?).into(),
            "consignee.province" => ConsigneeField::Province(text(path, value)?).into(),
            "consignee.country" => ConsigneeField::Country(text(path, value)?).into(),
            "consignee.phone" => ConsigneeField::Phone(text(path, value)?).into(),
            "consignee.email" => ConsigneeField::Email(text(path, value)?).into(),

            "shipment.transportMeans" => ShipmentField::TransportMeans(text(path, value)?).into(),
            "shipment.vehicleInfo" => ShipmentField::VehicleInfo(text(path, value)?).into(),
            "shipment.exportDate" => ShipmentField::ExportDate(date(path, value)?).into(),
            "shipment.blAwbNumber" => ShipmentField::BlAwbNumber(text(path, value)?).into(),
            "shipment.grossWeight" => ShipmentField::GrossWeight(number(path, value)?).into(),
            "shipment.totalPackages" => ShipmentField::TotalPackages(count(path, value)?).into(),
            "shipment.packageUnit" => ShipmentField::PackageUnit(text(path, value)?).into(),
            "shipment.destinationCountry" => {
                ShipmentField::DestinationCountry(text(path, value)?).into()
            }
            "shipment.portOfEntry" => ShipmentField::PortOfEntry(text(path, value)?).into(),
            "shipment.transitPorts" => ShipmentField::TransitPorts(list(path, value)?).into(),
            "shipment.shippingMarks" => ShipmentField::ShippingMarks(list(path, value)?).into(),
            "shipment.totalNetWeight" => ShipmentField::TotalNetWeight(number(path, value)?).into(),
            "shipment.originCountry" => ShipmentField::OriginCountry(text(path, value)?).into(),
            "shipment.originalPCNumber" => {
                ShipmentField::OriginalPcNumber(text(path, value)?).into()
            }
            "shipment.entryDateToThailand" => {
                ShipmentField::EntryDateToThailand(date(path, value)?).into()
            }

            "issuance.stationId" => IssuanceField::StationId(text(path, value)?).into(),

            "inspection.type" => {
                let raw = text(path, value)?;
                let mode = raw.parse().map_err(DomainError::validation)?;
                InspectionField::Mode(mode).into()
            }
            "inspection.appointmentDate" => {
                InspectionField::AppointmentDate(date(path, value)?).into()
            }
            "inspection.appointmentTime" => {
                InspectionField::AppointmentTime(time(path, value)?).into()
            }
            "inspection.contactPerson" => InspectionField::ContactPerson(text(path, value)?).into(),
            "inspection.thirdPartyCompanyId" => {
                InspectionField::ThirdPartyCompanyId(text(path, value)?).into()
            }
            "inspection.siteName" => InspectionField::SiteName(text(path, value)?).into(),
            "inspection.latitude" => InspectionField::Latitude(text(path, value)?).into(),
            "inspection.longitude" => InspectionField::Longitude(text(path, value)?).into(),
            "inspection.siteAddress" => InspectionField::SiteAddress(text(path, value)?).into(),

            "originalCertificateId" => {
                ReplacementField::OriginalCertificateId(text(path, value)?).into()
            }
            "replacementReason" => {
                let raw = text(path, value)?;
                let reason = if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse().map_err(DomainError::validation)?)
                };
                ReplacementField::Reason(reason).into()
            }

            _ => return Err(DomainError::invalid_path(path)),
        };
        Ok(update)
    }
}

fn mismatch(path: &str, expected: &str, value: &JsonValue) -> DomainError {
    DomainError::validation(format!("{path}: expected {expected}, got {value}"))
}

fn text(path: &str, value: &JsonValue) -> DomainResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(path, "a string", value))
}

fn flag(path: &str, value: &JsonValue) -> DomainResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| mismatch(path, "a boolean", value))
}

/// Numbers arrive either as JSON numbers or as the raw text of a number input.
fn number(path: &str, value: &JsonValue) -> DomainResult<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| mismatch(path, "a number", value)),
        JsonValue::String(s) if s.trim().is_empty() => Ok(0.0),
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| mismatch(path, "a number", value)),
        _ => Err(mismatch(path, "a number", value)),
    }
}

fn count(path: &str, value: &JsonValue) -> DomainResult<u32> {
    let n = number(path, value)?;
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(mismatch(path, "a whole non-negative number", value));
    }
    Ok(n as u32)
}

fn date(path: &str, value: &JsonValue) -> DomainResult<Option<NaiveDate>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.is_empty() => Ok(None),
        JsonValue::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| mismatch(path, "a YYYY-MM-DD date", value)),
        _ => Err(mismatch(path, "a YYYY-MM-DD date", value)),
    }
}

fn time(path: &str, value: &JsonValue) -> DomainResult<Option<NaiveTime>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.is_empty() => Ok(None),
        JsonValue::String(s) => NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(Some)
            .map_err(|_| mismatch(path, "an HH:MM time", value)),
        _ => Err(mismatch(path, "an HH:MM time", value)),
    }
}

fn list(path: &str, value: &JsonValue) -> DomainResult<Vec<String>> {
    let entries = value
        .as_array()
        .ok_or_else(|| mismatch(path, "a list of strings", value))?;
    entries.iter().map(|entry| text(path, entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_known_paths() {
        assert_eq!(
            FieldUpdate::from_path("consignee.companyName", &json!("Tokyo Fruit")).unwrap(),
            FieldUpdate::Consignee(ConsigneeField::CompanyName("Tokyo Fruit".into()))
        );
        assert_eq!(
            FieldUpdate::from_path("shipment.totalNetWeight", &json!(20.0)).unwrap(),
            FieldUpdate::Shipment(ShipmentField::TotalNetWeight(20.0))
        );
        assert_eq!(
            FieldUpdate::from_path("inspection.type", &json!("Off-site")).unwrap(),
            FieldUpdate::Inspection(InspectionField::Mode(InspectionMode::OffSite))
        );
        assert_eq!(
            FieldUpdate::from_path("replacementReason", &json!("Lost")).unwrap(),
            FieldUpdate::Replacement(ReplacementField::Reason(Some(ReplacementReason::Lost)))
        );
    }

    #[test]
    fn unknown_or_read_only_paths_fail_fast() {
        for path in ["consignee.nickname", "status", "id", "shipment.items", "shipment", ""] {
            let err = FieldUpdate::from_path(path, &json!("x")).unwrap_err();
            assert_eq!(err, DomainError::invalid_path(path));
        }
    }

    #[test]
    fn wrong_value_shape_is_a_validation_error() {
        let err = FieldUpdate::from_path("exporter.isOnBehalfOf", &json!("yes")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = FieldUpdate::from_path("shipment.totalPackages", &json!(2.5)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = FieldUpdate::from_path("shipment.exportDate", &json!("20/05/2024")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn numeric_text_and_empty_dates_are_accepted() {
        assert_eq!(
            FieldUpdate::from_path("shipment.grossWeight", &json!("500.5")).unwrap(),
            FieldUpdate::Shipment(ShipmentField::GrossWeight(500.5))
        );
        assert_eq!(
            FieldUpdate::from_path("shipment.exportDate", &json!("")).unwrap(),
            FieldUpdate::Shipment(ShipmentField::ExportDate(None))
        );
        assert_eq!(
            FieldUpdate::from_path("inspection.appointmentTime", &json!("09:00")).unwrap(),
            FieldUpdate::Inspection(InspectionField::AppointmentTime(NaiveTime::from_hms_opt(9, 0, 0)))
        );
    }

    #[test]
    fn path_round_trips_through_from_path() {
        let samples = [
            ("exporter.obName", json!("AGENT")),
            ("shipment.transitPorts", json!(["SINGAPORE"])),
            ("shipment.originalPCNumber", json!("US-8812")),
            ("issuance.stationId", json!("2")),
            ("inspection.siteAddress", json!("KM 5")),
            ("originalCertificateId", json!("PC-2024-00123")),
        ];
        for (path, value) in samples {
            let update = FieldUpdate::from_path(path, &value).unwrap();
            assert_eq!(update.path(), path);
        }
    }
}
