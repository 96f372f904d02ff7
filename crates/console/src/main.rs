use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, NaiveTime, Utc};

use ecert_application::{
    ApplicationStatus, ApplicationType, ConsigneeField, InspectionField, IssuanceField,
    ItemDetails, ShipmentField,
};
use ecert_catalog::{CatalogProvider, InMemoryCatalog, ProductId};
use ecert_core::AggregateRoot;
use ecert_infra::read_model::dashboard;
use ecert_infra::seed::seed_applications_with;
use ecert_infra::{AppConfig, InMemoryListing, ListingService};
use ecert_wizard::{Step, WizardController, WizardError};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    ecert_observability::init(&config.telemetry);

    let listing = Arc::new(InMemoryListing::with_applications(
        seed_applications_with(&config.defaults).context("building seed data")?,
    ));
    tracing::info!(count = listing.len(), "listing seeded");

    let catalog = InMemoryCatalog::standard();
    let mango = catalog
        .search("mango")
        .into_iter()
        .next()
        .context("mango missing from catalog")?
        .id;
    let durian = ProductId::new("p2")?;

    let mut wizard = WizardController::create(
        ApplicationType::Export,
        &config.defaults,
        Arc::clone(&listing),
    )?
    .with_policy(config.navigation);

    wizard.goto(Step::Consignee)?;
    for issue in wizard.current_issues() {
        println!("{}: {issue}", wizard.step());
    }
    wizard.update(ConsigneeField::CompanyName("Singapore Green Market".into()).into())?;
    wizard.update(ConsigneeField::Address("12 Orchard Road, #04-01".into()).into())?;
    wizard.update(ConsigneeField::Country("Singapore".into()).into())?;
    wizard.next()?;

    wizard.update(ShipmentField::TransportMeans("Air Freight".into()).into())?;
    wizard.update(ShipmentField::DestinationCountry("Singapore".into()).into())?;
    wizard.add_item(&mango, ItemDetails::form_defaults().with_net_weight(120.5))?;
    wizard.add_item(&durian, ItemDetails::form_defaults().with_net_weight(80.0))?;
    wizard.update(ShipmentField::TotalNetWeight(200.5).into())?;
    wizard.next()?;

    wizard.update(IssuanceField::StationId("1".into()).into())?;
    wizard.next()?;

    let appointment = Utc::now().date_naive().checked_add_days(Days::new(3));
    wizard.update(InspectionField::AppointmentDate(appointment).into())?;
    wizard.update(InspectionField::AppointmentTime(NaiveTime::from_hms_opt(10, 0, 0)).into())?;

    // A late edit leaves the declared total half a kilo short, so the first
    // attempt bounces.
    wizard.update(ShipmentField::TotalNetWeight(200.0).into())?;
    match wizard.submit_final() {
        Err(WizardError::WeightMismatch { declared, itemized }) => {
            println!("Submission blocked: declared {declared:.2} kg, items sum to {itemized:.2} kg");
            wizard.update(ShipmentField::TotalNetWeight(itemized).into())?;
        }
        Err(other) => return Err(other.into()),
        Ok(_) => {}
    }
    if !wizard.is_closed() {
        let submitted = wizard.submit_final()?;
        println!("Submitted {} ({})", submitted.id(), submitted.status());
    }

    // Back office moves the oldest record along.
    if let Some(first) = listing.list().first() {
        if let Some(next) = first.status().successor() {
            listing.transition(first.id(), next)?;
        }
    }

    let summary = dashboard::summary(listing.as_ref());
    println!();
    print!("{}", dashboard::render_table(&dashboard::rows(listing.as_ref())));
    println!();
    println!("Total applications: {}", summary.total);
    for (kind, count) in &summary.by_type {
        println!("  {kind}: {count}");
    }
    println!(
        "  awaiting document check: {}",
        summary.count_status(ApplicationStatus::WaitingDocumentCheck)
    );

    Ok(())
}
