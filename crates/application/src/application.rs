use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ecert_core::{
    Aggregate, AggregateRoot, ApplicationId, DomainError, EnglishText, Entity, ItemId,
};
use ecert_events::Event;

use crate::compose::non_negative;
use crate::field::{
    ConsigneeField, ExporterField, FieldUpdate, InspectionField, IssuanceField, ReplacementField,
    ShipmentField,
};
use crate::item::Item;
use crate::model::{
    ApplicationStatus, ApplicationType, Consignee, Exporter, ExporterProfile, Inspection,
    InspectionMode, Issuance, ReExportOrigin, ReplacementDetails, Shipment,
};
use crate::validation::shipment_weight_mismatch;

pub const DEFAULT_REPLACEMENT_FEE_THB: f64 = 50.0;

/// Values injected into every new application by the surrounding system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDefaults {
    pub exporter: ExporterProfile,
    pub replacement_fee_thb: f64,
}

impl Default for ApplicationDefaults {
    fn default() -> Self {
        Self {
            exporter: ExporterProfile::default(),
            replacement_fee_thb: DEFAULT_REPLACEMENT_FEE_THB,
        }
    }
}

/// Aggregate root: one certificate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    id: ApplicationId,
    #[serde(rename = "type")]
    application_type: ApplicationType,
    status: ApplicationStatus,
    created_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<ReplacementDetails>,
    exporter: Exporter,
    consignee: Consignee,
    shipment: Shipment,
    issuance: Issuance,
    inspection: Inspection,
    version: u64,
}

impl Application {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ApplicationId, application_type: ApplicationType) -> Self {
        Self {
            id,
            application_type,
            status: ApplicationStatus::New,
            created_at: NaiveDate::MIN,
            replacement: None,
            exporter: Exporter::from_profile(&ExporterProfile::default()),
            consignee: Consignee::default(),
            shipment: Shipment::default(),
            issuance: Issuance::default(),
            inspection: Inspection::default(),
            version: 0,
        }
    }

    /// Run a create command against an empty instance.
    pub fn create(cmd: CreateApplication) -> Result<(Self, ApplicationEvent), DomainError> {
        let empty = Self::empty(cmd.application_id.clone(), cmd.application_type);
        let (next, mut events) = empty.execute(&ApplicationCommand::Create(cmd))?;
        match (next, events.pop()) {
            (Some(app), Some(event)) => Ok((app, event)),
            _ => Err(DomainError::invariant("create produced no events")),
        }
    }

    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn created_at(&self) -> NaiveDate {
        self.created_at
    }

    /// Present on replacement (P.Q. 9) applications only.
    pub fn replacement(&self) -> Option<&ReplacementDetails> {
        self.replacement.as_ref()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn consignee(&self) -> &Consignee {
        &self.consignee
    }

    pub fn shipment(&self) -> &Shipment {
        &self.shipment
    }

    pub fn items(&self) -> &[Item] {
        &self.shipment.items
    }

    pub fn issuance(&self) -> &Issuance {
        &self.issuance
    }

    pub fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    pub fn is_created(&self) -> bool {
        self.version > 0
    }

    /// Only drafts can be edited.
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, ApplicationStatus::New)
    }
}

impl AggregateRoot for Application {
    type Id = ApplicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateApplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApplication {
    pub application_id: ApplicationId,
    pub application_type: ApplicationType,
    pub created_at: NaiveDate,
    pub defaults: ApplicationDefaults,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateField.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateField {
    pub application_id: ApplicationId,
    pub update: FieldUpdate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItem {
    pub application_id: ApplicationId,
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub application_id: ApplicationId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplicationCommand {
    Create(CreateApplication),
    UpdateField(UpdateField),
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    ChangeStatus(ChangeStatus),
}

/// Event: ApplicationCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCreated {
    pub application_id: ApplicationId,
    pub application_type: ApplicationType,
    pub created_at: NaiveDate,
    pub exporter: ExporterProfile,
    pub replacement_fee_thb: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FieldUpdated. Carries the update after input normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdated {
    pub application_id: ApplicationId,
    pub update: FieldUpdate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub application_id: ApplicationId,
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub application_id: ApplicationId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub application_id: ApplicationId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplicationEvent {
    Created(ApplicationCreated),
    FieldUpdated(FieldUpdated),
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    StatusChanged(StatusChanged),
}

impl Event for ApplicationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ApplicationEvent::Created(_) => "application.created",
            ApplicationEvent::FieldUpdated(_) => "application.field_updated",
            ApplicationEvent::ItemAdded(_) => "application.item_added",
            ApplicationEvent::ItemRemoved(_) => "application.item_removed",
            ApplicationEvent::StatusChanged(_) => "application.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ApplicationEvent::Created(e) => e.occurred_at,
            ApplicationEvent::FieldUpdated(e) => e.occurred_at,
            ApplicationEvent::ItemAdded(e) => e.occurred_at,
            ApplicationEvent::ItemRemoved(e) => e.occurred_at,
            ApplicationEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Application {
    type Command = ApplicationCommand;
    type Event = ApplicationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ApplicationEvent::Created(e) => {
                self.id = e.application_id.clone();
                self.application_type = e.application_type;
                self.status = ApplicationStatus::New;
                self.created_at = e.created_at;
                self.exporter = Exporter::from_profile(&e.exporter);
                self.consignee = Consignee::default();
                self.shipment = Shipment::default();
                self.issuance = Issuance::default();
                self.inspection = Inspection::default();
                self.replacement = (e.application_type == ApplicationType::Replacement).then(|| {
                    ReplacementDetails {
                        original_certificate_id: String::new(),
                        replacement_reason: None,
                        replacement_fee: e.replacement_fee_thb,
                    }
                });
                if e.application_type == ApplicationType::ReExport {
                    self.shipment.re_export = Some(ReExportOrigin::default());
                }
            }
            ApplicationEvent::FieldUpdated(e) => self.apply_update(&e.update),
            ApplicationEvent::ItemAdded(e) => {
                self.shipment.items.push(e.item.clone());
            }
            ApplicationEvent::ItemRemoved(e) => {
                self.shipment.items.retain(|item| item.id() != &e.item_id);
            }
            ApplicationEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ApplicationCommand::Create(cmd) => self.handle_create(cmd),
            ApplicationCommand::UpdateField(cmd) => self.handle_update(cmd),
            ApplicationCommand::AddItem(cmd) => self.handle_add_item(cmd),
            ApplicationCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
            ApplicationCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
        }
    }
}

impl Application {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.is_created() {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_application_id(&self, id: &ApplicationId) -> Result<(), DomainError> {
        if &self.id != id {
            return Err(DomainError::invariant("application_id mismatch"));
        }
        Ok(())
    }

    fn ensure_modifiable(&self) -> Result<(), DomainError> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(format!(
                "application is locked once submitted (status: {})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateApplication) -> Result<Vec<ApplicationEvent>, DomainError> {
        if self.is_created() {
            return Err(DomainError::conflict("application already exists"));
        }
        if cmd.application_id.prefix() != cmd.application_type.id_prefix() {
            return Err(DomainError::invalid_id(format!(
                "{} applications use the '{}' prefix, got '{}'",
                cmd.application_type,
                cmd.application_type.id_prefix(),
                cmd.application_id
            )));
        }
        let fee = non_negative("replacement fee", cmd.defaults.replacement_fee_thb)?;

        Ok(vec![ApplicationEvent::Created(ApplicationCreated {
            application_id: cmd.application_id.clone(),
            application_type: cmd.application_type,
            created_at: cmd.created_at,
            exporter: cmd.defaults.exporter.clone(),
            replacement_fee_thb: fee,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateField) -> Result<Vec<ApplicationEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_application_id(&cmd.application_id)?;
        self.ensure_modifiable()?;

        let update = self.normalize(&cmd.update)?;

        Ok(vec![ApplicationEvent::FieldUpdated(FieldUpdated {
            application_id: cmd.application_id.clone(),
            update,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Check the update against the record's type and mode, and apply the
    /// input policies (English filtering, uppercase vehicle info).
    fn normalize(&self, update: &FieldUpdate) -> Result<FieldUpdate, DomainError> {
        let normalized: FieldUpdate = match update {
            FieldUpdate::Exporter(ExporterField::RepresentativeName(s)) => {
                self.ensure_on_behalf(update)?;
                ExporterField::RepresentativeName(EnglishText::filtered(s).to_string()).into()
            }
            FieldUpdate::Exporter(ExporterField::RepresentativeAddress(s)) => {
                self.ensure_on_behalf(update)?;
                ExporterField::RepresentativeAddress(EnglishText::filtered(s).to_string()).into()
            }
            FieldUpdate::Consignee(ConsigneeField::CompanyName(s)) => {
                ConsigneeField::CompanyName(EnglishText::filtered(s).to_string()).into()
            }
            FieldUpdate::Consignee(ConsigneeField::Address(s)) => {
                ConsigneeField::Address(EnglishText::filtered(s).to_string()).into()
            }
            FieldUpdate::Shipment(ShipmentField::VehicleInfo(s)) => {
                ShipmentField::VehicleInfo(s.to_uppercase()).into()
            }
            FieldUpdate::Shipment(ShipmentField::GrossWeight(kg)) => {
                ShipmentField::GrossWeight(non_negative("gross weight", *kg)?).into()
            }
            FieldUpdate::Shipment(ShipmentField::TotalNetWeight(kg)) => {
                ShipmentField::TotalNetWeight(non_negative("total net weight", *kg)?).into()
            }
            FieldUpdate::Shipment(
                ShipmentField::OriginCountry(_)
                | ShipmentField::OriginalPcNumber(_)
                | ShipmentField::EntryDateToThailand(_),
            ) => {
                self.ensure_type(ApplicationType::ReExport, update)?;
                update.clone()
            }
            FieldUpdate::Inspection(
                InspectionField::ContactPerson(_)
                | InspectionField::ThirdPartyCompanyId(_)
                | InspectionField::SiteName(_)
                | InspectionField::Latitude(_)
                | InspectionField::Longitude(_)
                | InspectionField::SiteAddress(_),
            ) => {
                if self.inspection.mode != InspectionMode::OffSite {
                    return Err(DomainError::invariant(format!(
                        "{} applies to off-site inspections only",
                        update.path()
                    )));
                }
                update.clone()
            }
            FieldUpdate::Replacement(_) => {
                self.ensure_type(ApplicationType::Replacement, update)?;
                update.clone()
            }
            _ => update.clone(),
        };
        Ok(normalized)
    }

    fn ensure_type(&self, expected: ApplicationType, update: &FieldUpdate) -> Result<(), DomainError> {
        if self.application_type != expected {
            return Err(DomainError::invariant(format!(
                "{} applies to {} applications only",
                update.path(),
                expected
            )));
        }
        Ok(())
    }

    fn ensure_on_behalf(&self, update: &FieldUpdate) -> Result<(), DomainError> {
        if !self.exporter.is_on_behalf_of {
            return Err(DomainError::invariant(format!(
                "{} requires the on-behalf-of flag",
                update.path()
            )));
        }
        Ok(())
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<ApplicationEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_application_id(&cmd.application_id)?;
        self.ensure_modifiable()?;

        if self.shipment.items.iter().any(|i| i.id() == cmd.item.id()) {
            return Err(DomainError::conflict(format!(
                "item '{}' is already on the manifest",
                cmd.item.id()
            )));
        }

        Ok(vec![ApplicationEvent::ItemAdded(ItemAdded {
            application_id: cmd.application_id.clone(),
            item: cmd.item.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<ApplicationEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_application_id(&cmd.application_id)?;
        self.ensure_modifiable()?;

        if !self.shipment.items.iter().any(|i| i.id() == &cmd.item_id) {
            return Ok(Vec::new());
        }

        Ok(vec![ApplicationEvent::ItemRemoved(ItemRemoved {
            application_id: cmd.application_id.clone(),
            item_id: cmd.item_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<ApplicationEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_application_id(&cmd.application_id)?;

        if !self.status.can_transition_to(cmd.status) {
            return Err(DomainError::invariant(format!(
                "cannot move application from '{}' to '{}'",
                self.status, cmd.status
            )));
        }
        if self.status == cmd.status {
            return Ok(Vec::new());
        }

        // Cancelling never certifies anything, so only forward moves are gated.
        if cmd.status != ApplicationStatus::Cancelled {
            if let Some(m) = shipment_weight_mismatch(&self.shipment) {
                return Err(DomainError::invariant(format!(
                    "net weight mismatch: declared {:.2} kg, items sum to {:.2} kg",
                    m.declared, m.itemized
                )));
            }
        }

        Ok(vec![ApplicationEvent::StatusChanged(StatusChanged {
            application_id: cmd.application_id.clone(),
            from: self.status,
            to: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn apply_update(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Exporter(f) => {
                let exporter = &mut self.exporter;
                match f {
                    ExporterField::OnBehalfOf(v) => exporter.is_on_behalf_of = *v,
                    ExporterField::RepresentativeName(s) => exporter.ob_name = EnglishText::filtered(s),
                    ExporterField::RepresentativeAddress(s) => {
                        exporter.ob_address = EnglishText::filtered(s)
                    }
                }
            }
            FieldUpdate::Consignee(f) => {
                let c = &mut self.consignee;
                match f {
                    ConsigneeField::TaxId(s) => c.tax_id = s.clone(),
                    ConsigneeField::Branch(s) => c.branch = s.clone(),
                    ConsigneeField::CompanyName(s) => c.company_name = EnglishText::filtered(s),
                    ConsigneeField::Address(s) => c.address = EnglishText::filtered(s),
                    ConsigneeField::Subdistrict(s) => c.subdistrict = s.clone(),
                    ConsigneeField::District(s) => c.district = s.clone(),
                    ConsigneeField::Province(s) => c.province = s.clone(),
                    ConsigneeField::Country(s) => c.country = s.clone(),
                    ConsigneeField::Phone(s) => c.phone = s.clone(),
                    ConsigneeField::Email(s) => c.email = s.clone(),
                }
            }
            FieldUpdate::Shipment(f) => {
                let s = &mut self.shipment;
                match f {
                    ShipmentField::TransportMeans(v) => s.transport_means = v.clone(),
                    ShipmentField::VehicleInfo(v) => s.vehicle_info = v.clone(),
                    ShipmentField::ExportDate(v) => s.export_date = *v,
                    ShipmentField::BlAwbNumber(v) => s.bl_awb_number = v.clone(),
                    ShipmentField::GrossWeight(v) => s.gross_weight = *v,
                    ShipmentField::TotalPackages(v) => s.total_packages = *v,
                    ShipmentField::PackageUnit(v) => s.package_unit = v.clone(),
                    ShipmentField::DestinationCountry(v) => s.destination_country = v.clone(),
                    ShipmentField::PortOfEntry(v) => s.port_of_entry = v.clone(),
                    ShipmentField::TransitPorts(v) => s.transit_ports = v.clone(),
                    ShipmentField::ShippingMarks(v) => s.shipping_marks = v.clone(),
                    ShipmentField::TotalNetWeight(v) => s.total_net_weight = *v,
                    ShipmentField::OriginCountry(v) => {
                        s.re_export.get_or_insert_with(Default::default).origin_country = v.clone()
                    }
                    ShipmentField::OriginalPcNumber(v) => {
                        s.re_export
                            .get_or_insert_with(Default::default)
                            .original_pc_number = v.clone()
                    }
                    ShipmentField::EntryDateToThailand(v) => {
                        s.re_export
                            .get_or_insert_with(Default::default)
                            .entry_date_to_thailand = *v
                    }
                }
            }
            FieldUpdate::Issuance(IssuanceField::StationId(v)) => {
                self.issuance.station_id = v.clone();
            }
            FieldUpdate::Inspection(f) => {
                let i = &mut self.inspection;
                match f {
                    InspectionField::Mode(v) => i.mode = *v,
                    InspectionField::AppointmentDate(v) => i.appointment_date = *v,
                    InspectionField::AppointmentTime(v) => i.appointment_time = *v,
                    InspectionField::ContactPerson(v) => i.off_site.contact_person = v.clone(),
                    InspectionField::ThirdPartyCompanyId(v) => {
                        i.off_site.third_party_company_id = v.clone()
                    }
                    InspectionField::SiteName(v) => i.off_site.site_name = v.clone(),
                    InspectionField::Latitude(v) => i.off_site.latitude = v.clone(),
                    InspectionField::Longitude(v) => i.off_site.longitude = v.clone(),
                    InspectionField::SiteAddress(v) => i.off_site.site_address = v.clone(),
                }
            }
            FieldUpdate::Replacement(f) => {
                if let Some(r) = self.replacement.as_mut() {
                    match f {
                        ReplacementField::OriginalCertificateId(v) => {
                            r.original_certificate_id = v.clone()
                        }
                        ReplacementField::Reason(v) => r.replacement_reason = *v,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::compose::{ItemComposer, ItemDetails};
    use ecert_catalog::PlantProduct;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    pub(crate) fn test_id(application_type: ApplicationType) -> ApplicationId {
        format!("{}-2024-1234", application_type.id_prefix())
            .parse()
            .unwrap()
    }

    /// A freshly created draft.
    pub(crate) fn draft(application_type: ApplicationType) -> Application {
        let cmd = CreateApplication {
            application_id: test_id(application_type),
            application_type,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            defaults: ApplicationDefaults::default(),
            occurred_at: test_time(),
        };
        Application::create(cmd).unwrap().0
    }

    pub(crate) fn update(app: &Application, update: FieldUpdate) -> Application {
        let cmd = ApplicationCommand::UpdateField(UpdateField {
            application_id: app.id().clone(),
            update,
            occurred_at: test_time(),
        });
        app.execute(&cmd).unwrap().0.unwrap()
    }

    pub(crate) fn add(app: &Application, item: Item) -> Application {
        let cmd = ApplicationCommand::AddItem(AddItem {
            application_id: app.id().clone(),
            item,
            occurred_at: test_time(),
        });
        app.execute(&cmd).unwrap().0.unwrap()
    }

    pub(crate) fn item(net_weight: f64, composer: &mut ItemComposer<StdRng>) -> Item {
        let product = PlantProduct::new("p1", "Mango (Nam Dok Mai)", "Mangifera indica").unwrap();
        composer
            .compose(&product, ItemDetails::form_defaults().with_net_weight(net_weight))
            .unwrap()
    }

    /// A draft carrying one item per weight.
    pub(crate) fn with_items(application_type: ApplicationType, weights: &[f64]) -> Application {
        let mut composer = ItemComposer::with_rng(StdRng::seed_from_u64(7));
        weights
            .iter()
            .fold(draft(application_type), |app, w| add(&app, item(*w, &mut composer)))
    }

    fn change_status(app: &Application, status: ApplicationStatus) -> Result<Vec<ApplicationEvent>, DomainError> {
        app.handle(&ApplicationCommand::ChangeStatus(ChangeStatus {
            application_id: app.id().clone(),
            status,
            occurred_at: test_time(),
        }))
    }

    fn submitted() -> Application {
        let app = with_items(ApplicationType::Export, &[10.0]);
        let app = update(&app, ShipmentField::TotalNetWeight(10.0).into());
        let events = change_status(&app, ApplicationStatus::WaitingDocumentCheck).unwrap();
        let mut app = app;
        app.apply(&events[0]);
        app
    }

    #[test]
    fn create_emits_created_event_and_seeds_defaults() {
        let app = Application::empty(test_id(ApplicationType::Export), ApplicationType::Export);
        let cmd = CreateApplication {
            application_id: test_id(ApplicationType::Export),
            application_type: ApplicationType::Export,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            defaults: ApplicationDefaults::default(),
            occurred_at: test_time(),
        };
        let events = app.handle(&ApplicationCommand::Create(cmd)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "application.created");

        let app = draft(ApplicationType::Export);
        assert_eq!(app.version(), 1);
        assert_eq!(app.status(), ApplicationStatus::New);
        assert_eq!(app.exporter().name, "Thai Exports Co., Ltd.");
        assert!(!app.exporter().is_on_behalf_of);
        assert!(app.replacement().is_none());
        assert!(app.shipment().re_export.is_none());
    }

    #[test]
    fn replacement_and_re_export_get_type_specific_records() {
        let rep = draft(ApplicationType::Replacement);
        assert_eq!(rep.replacement().unwrap().replacement_fee, 50.0);

        let rex = draft(ApplicationType::ReExport);
        assert_eq!(rex.shipment().re_export, Some(ReExportOrigin::default()));
    }

    #[test]
    fn create_twice_is_a_conflict() {
        let app = draft(ApplicationType::Export);
        let cmd = CreateApplication {
            application_id: app.id().clone(),
            application_type: ApplicationType::Export,
            created_at: app.created_at(),
            defaults: ApplicationDefaults::default(),
            occurred_at: test_time(),
        };
        let err = app.handle(&ApplicationCommand::Create(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn create_rejects_prefix_of_another_type() {
        let cmd = CreateApplication {
            application_id: test_id(ApplicationType::ReExport),
            application_type: ApplicationType::Export,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            defaults: ApplicationDefaults::default(),
            occurred_at: test_time(),
        };
        let err = Application::create(cmd).unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn commands_on_uncreated_aggregate_are_not_found() {
        let app = Application::empty(test_id(ApplicationType::Export), ApplicationType::Export);
        let err = app
            .handle(&ApplicationCommand::UpdateField(UpdateField {
                application_id: app.id().clone(),
                update: ConsigneeField::Phone("1".into()).into(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn english_fields_are_filtered_on_input() {
        let app = draft(ApplicationType::Export);
        let app = update(&app, ConsigneeField::CompanyName("Tokyo Fruit (Japan) K.K.".into()).into());
        assert_eq!(app.consignee().company_name.as_str(), "TOKYO FRUIT JAPAN K.K.");
    }

    #[test]
    fn vehicle_info_is_forced_uppercase() {
        let app = update(
            &draft(ApplicationType::Export),
            ShipmentField::VehicleInfo("tg 676 / bkk-nrt".into()).into(),
        );
        assert_eq!(app.shipment().vehicle_info, "TG 676 / BKK-NRT");
    }

    #[test]
    fn negative_weights_are_rejected() {
        let app = draft(ApplicationType::Export);
        let err = app
            .handle(&ApplicationCommand::UpdateField(UpdateField {
                application_id: app.id().clone(),
                update: ShipmentField::GrossWeight(-1.0).into(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn type_scoped_fields_are_gated() {
        let export = draft(ApplicationType::Export);
        for update in [
            FieldUpdate::from(ReplacementField::OriginalCertificateId("X".into())),
            ShipmentField::OriginCountry("USA".into()).into(),
            ExporterField::RepresentativeName("AGENT".into()).into(),
            InspectionField::SiteName("FARM".into()).into(),
        ] {
            let err = export
                .handle(&ApplicationCommand::UpdateField(UpdateField {
                    application_id: export.id().clone(),
                    update: update.clone(),
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            assert!(
                matches!(err, DomainError::InvariantViolation(_)),
                "{} was accepted",
                update.path()
            );
        }

        let on_behalf = update(&export, ExporterField::OnBehalfOf(true).into());
        let named = update(&on_behalf, ExporterField::RepresentativeName("agent co".into()).into());
        assert_eq!(named.exporter().representative().unwrap().name.as_str(), "AGENT CO");

        let off_site = update(&export, InspectionField::Mode(InspectionMode::OffSite).into());
        let sited = update(&off_site, InspectionField::SiteName("Farm 9".into()).into());
        assert_eq!(sited.inspection().off_site().unwrap().site_name, "Farm 9");
    }

    #[test]
    fn update_leaves_previous_snapshot_untouched() {
        let before = draft(ApplicationType::Export);
        let after = update(&before, ConsigneeField::Country("Japan".into()).into());

        assert_eq!(before.consignee().country, "");
        assert_eq!(after.consignee().country, "Japan");
        assert_eq!(before.shipment(), after.shipment());
        assert_eq!(before.exporter(), after.exporter());
        assert_eq!(after.version(), before.version() + 1);
    }

    #[test]
    fn add_and_remove_items_preserve_order() {
        let app = with_items(ApplicationType::Export, &[1.0, 2.0, 3.0]);
        let ids: Vec<ItemId> = app.items().iter().map(|i| i.id().clone()).collect();
        assert_eq!(app.items().len(), 3);

        let (next, events) = app
            .execute(&ApplicationCommand::RemoveItem(RemoveItem {
                application_id: app.id().clone(),
                item_id: ids[1].clone(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);
        let next = next.unwrap();
        let remaining: Vec<&ItemId> = next.items().iter().map(Item::id).collect();
        assert_eq!(remaining, vec![&ids[0], &ids[2]]);
    }

    #[test]
    fn removing_unknown_item_is_a_silent_no_op() {
        let app = with_items(ApplicationType::Export, &[1.0]);
        let (next, events) = app
            .execute(&ApplicationCommand::RemoveItem(RemoveItem {
                application_id: app.id().clone(),
                item_id: "zzzzzzzzz".parse().unwrap(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(next.is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn duplicate_item_is_a_conflict() {
        let app = with_items(ApplicationType::Export, &[1.0]);
        let dup = app.items()[0].clone();
        let err = app
            .handle(&ApplicationCommand::AddItem(AddItem {
                application_id: app.id().clone(),
                item: dup,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn submission_requires_reconciled_weights() {
        let app = with_items(ApplicationType::Export, &[10.005, 9.995]);
        let mismatched = update(&app, ShipmentField::TotalNetWeight(19.0).into());
        let err = change_status(&mismatched, ApplicationStatus::WaitingDocumentCheck).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(ref m) if m.contains("mismatch")));

        // Drafts and cancellations are not gated.
        assert!(change_status(&mismatched, ApplicationStatus::New).unwrap().is_empty());
        assert_eq!(change_status(&mismatched, ApplicationStatus::Cancelled).unwrap().len(), 1);

        let reconciled = update(&app, ShipmentField::TotalNetWeight(20.0).into());
        let events = change_status(&reconciled, ApplicationStatus::WaitingDocumentCheck).unwrap();
        assert!(matches!(
            &events[0],
            ApplicationEvent::StatusChanged(e)
                if e.from == ApplicationStatus::New && e.to == ApplicationStatus::WaitingDocumentCheck
        ));
    }

    #[test]
    fn submitted_application_is_locked() {
        let app = submitted();
        assert!(!app.is_modifiable());

        let err = app
            .handle(&ApplicationCommand::UpdateField(UpdateField {
                application_id: app.id().clone(),
                update: ConsigneeField::Phone("+81".into()).into(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("locked") => {}
            other => panic!("expected lock violation, got {other:?}"),
        }
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let app = submitted();
        let err = change_status(&app, ApplicationStatus::New).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        let err = change_status(&app, ApplicationStatus::Approved).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn mismatched_application_id_is_rejected() {
        let app = draft(ApplicationType::Export);
        let err = app
            .handle(&ApplicationCommand::UpdateField(UpdateField {
                application_id: "APP-2024-9999".parse().unwrap(),
                update: ConsigneeField::Phone("1".into()).into(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let app = draft(ApplicationType::Export);
        let snapshot = app.clone();
        let _ = app
            .handle(&ApplicationCommand::UpdateField(UpdateField {
                application_id: app.id().clone(),
                update: ConsigneeField::Phone("1".into()).into(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(app, snapshot);
    }

    #[test]
    fn serializes_in_camel_case() {
        let app = draft(ApplicationType::Replacement);
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["type"], "PQ9");
        assert_eq!(json["status"], "New");
        assert_eq!(json["createdAt"], "2024-05-20");
        assert_eq!(json["replacement"]["replacementFee"], 50.0);
        assert!(json["shipment"]["totalNetWeight"].is_number());
        assert!(json["exporter"]["isOnBehalfOf"].is_boolean());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

            /// An update changes exactly its own leaf.
            #[test]
            fn update_only_touches_its_leaf(phone in "[0-9+ ]{0,16}", port in "[A-Za-z ]{0,12}") {
                let before = with_items(ApplicationType::Export, &[1.5]);
                let after = update(&before, ConsigneeField::Phone(phone.clone()).into());

                prop_assert_eq!(&after.consignee().phone, &phone);
                let mut restored = after.consignee().clone();
                restored.phone = before.consignee().phone.clone();
                prop_assert_eq!(&restored, before.consignee());
                prop_assert_eq!(after.shipment(), before.shipment());
                prop_assert_eq!(after.exporter(), before.exporter());
                prop_assert_eq!(after.inspection(), before.inspection());

                let after = update(&before, ShipmentField::PortOfEntry(port.clone()).into());
                prop_assert_eq!(&after.shipment().port_of_entry, &port);
                prop_assert_eq!(after.items(), before.items());
                prop_assert_eq!(after.consignee(), before.consignee());
            }

            /// Adding then removing an item restores the manifest.
            #[test]
            fn add_then_remove_restores_items(
                weights in proptest::collection::vec(0.0f64..1_000.0, 0..5),
                extra in 0.0f64..1_000.0,
            ) {
                let before = with_items(ApplicationType::Export, &weights);
                let mut composer = ItemComposer::with_rng(StdRng::seed_from_u64(4242));
                let fresh = item(extra, &mut composer);
                let fresh_id = fresh.id().clone();
                prop_assume!(before.items().iter().all(|i| i.id() != &fresh_id));

                let added = add(&before, fresh);
                prop_assert_eq!(added.items().len(), before.items().len() + 1);

                let (removed, _) = added
                    .execute(&ApplicationCommand::RemoveItem(RemoveItem {
                        application_id: added.id().clone(),
                        item_id: fresh_id,
                        occurred_at: test_time(),
                    }))
                    .unwrap();
                let removed = removed.unwrap();
                prop_assert_eq!(removed.items(), before.items());
            }
        }
    }
}
