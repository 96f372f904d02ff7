//! Mock applications shown on a fresh dashboard.

use chrono::{NaiveDate, NaiveTime, Utc};

use ecert_application::{
    Application, ApplicationDefaults, ApplicationStatus, ApplicationStore, ApplicationType,
    ConsigneeField, CreateApplication, FieldUpdate, InspectionField, InspectionMode,
    IssuanceField, ShipmentField,
};
use ecert_core::{DomainError, DomainResult};

fn date(y: i32, m: u32, d: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DomainError::validation(format!("invalid date {y}-{m}-{d}")))
}

fn time(h: u32, m: u32) -> DomainResult<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
        .ok_or_else(|| DomainError::validation(format!("invalid time {h}:{m}")))
}

fn build(
    id: &str,
    application_type: ApplicationType,
    created_at: NaiveDate,
    defaults: &ApplicationDefaults,
    updates: Vec<FieldUpdate>,
    path: &[ApplicationStatus],
) -> DomainResult<Application> {
    let mut store = ApplicationStore::create(CreateApplication {
        application_id: id.parse()?,
        application_type,
        created_at,
        defaults: defaults.clone(),
        occurred_at: Utc::now(),
    })?;
    for update in updates {
        store.update(update)?;
    }
    for status in path {
        store.change_status(*status)?;
    }
    Ok(store.current().clone())
}

/// One submitted export and one re-export draft.
pub fn seed_applications_with(defaults: &ApplicationDefaults) -> DomainResult<Vec<Application>> {
    let export = build(
        "APP-2024-001",
        ApplicationType::Export,
        date(2024, 5, 15)?,
        defaults,
        vec![
            ConsigneeField::TaxId("JP-999".into()).into(),
            ConsigneeField::Branch("001".into()).into(),
            ConsigneeField::CompanyName("Tokyo Fruit Importers".into()).into(),
            ConsigneeField::Address("4-5 Ginza, Tokyo".into()).into(),
            ConsigneeField::Subdistrict("-".into()).into(),
            ConsigneeField::District("Chuo".into()).into(),
            ConsigneeField::Province("Tokyo".into()).into(),
            ConsigneeField::Country("Japan".into()).into(),
            ConsigneeField::Phone("+81-3-1234-5678".into()).into(),
            ConsigneeField::Email("contact@tokyofruit.jp".into()).into(),
            ShipmentField::TransportMeans("Air Freight".into()).into(),
            ShipmentField::VehicleInfo("TG672".into()).into(),
            ShipmentField::ExportDate(Some(date(2024, 5, 20)?)).into(),
            ShipmentField::BlAwbNumber("AWB-888-999".into()).into(),
            ShipmentField::GrossWeight(500.0).into(),
            ShipmentField::TotalPackages(50).into(),
            ShipmentField::PackageUnit("Boxes".into()).into(),
            ShipmentField::DestinationCountry("Japan".into()).into(),
            ShipmentField::PortOfEntry("Narita".into()).into(),
            ShipmentField::ShippingMarks(vec!["FRAGILE".into()]).into(),
            ShipmentField::TotalNetWeight(450.0).into(),
            IssuanceField::StationId("2".into()).into(),
            InspectionField::AppointmentDate(Some(date(2024, 5, 18)?)).into(),
            InspectionField::AppointmentTime(Some(time(9, 0)?)).into(),
        ],
        &[
            ApplicationStatus::WaitingDocumentCheck,
            ApplicationStatus::WaitingInspection,
        ],
    )?;

    let re_export = build(
        "REX-2024-002",
        ApplicationType::ReExport,
        date(2024, 5, 18)?,
        defaults,
        vec![
            ConsigneeField::TaxId("CN-111".into()).into(),
            ConsigneeField::Branch("000".into()).into(),
            ConsigneeField::CompanyName("Shanghai Fresh".into()).into(),
            ConsigneeField::Address("99 Pudong, Shanghai".into()).into(),
            ConsigneeField::Subdistrict("-".into()).into(),
            ConsigneeField::District("Pudong".into()).into(),
            ConsigneeField::Province("Shanghai".into()).into(),
            ConsigneeField::Country("China".into()).into(),
            ConsigneeField::Phone("+86-21-999".into()).into(),
            ConsigneeField::Email("sh@fresh.cn".into()).into(),
            ShipmentField::TransportMeans("Sea Freight".into()).into(),
            ShipmentField::VehicleInfo("COSCO 12".into()).into(),
            ShipmentField::ExportDate(Some(date(2024, 6, 1)?)).into(),
            ShipmentField::BlAwbNumber("BL-Shanghai".into()).into(),
            ShipmentField::GrossWeight(2000.0).into(),
            ShipmentField::TotalPackages(100).into(),
            ShipmentField::PackageUnit("Pallets".into()).into(),
            ShipmentField::DestinationCountry("China".into()).into(),
            ShipmentField::PortOfEntry("Shanghai".into()).into(),
            ShipmentField::ShippingMarks(vec!["RE-EXPORT".into()]).into(),
            ShipmentField::TotalNetWeight(1800.0).into(),
            ShipmentField::OriginCountry("USA".into()).into(),
            ShipmentField::OriginalPcNumber("US-8812".into()).into(),
            ShipmentField::EntryDateToThailand(Some(date(2024, 4, 10)?)).into(),
            IssuanceField::StationId("3".into()).into(),
            InspectionField::Mode(InspectionMode::OffSite).into(),
            InspectionField::AppointmentDate(Some(date(2024, 5, 25)?)).into(),
            InspectionField::AppointmentTime(Some(time(14, 0)?)).into(),
        ],
        &[],
    )?;

    Ok(vec![export, re_export])
}

pub fn seed_applications() -> DomainResult<Vec<Application>> {
    seed_applications_with(&ApplicationDefaults::default())
}

/// Bare draft for tests.
#[cfg(test)]
pub(crate) fn draft(application_type: ApplicationType, id: &str) -> Application {
    build(
        id,
        application_type,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        &ApplicationDefaults::default(),
        Vec::new(),
        &[],
    )
    .unwrap()
}
