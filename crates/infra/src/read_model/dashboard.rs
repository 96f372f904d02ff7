//! Dashboard projection over the listing.

use chrono::NaiveDate;
use serde::Serialize;

use ecert_application::{Application, ApplicationStatus, ApplicationType};
use ecert_core::AggregateRoot;

use super::listing::ListingService;

/// Headline counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    /// One entry per type, in type order, zero counts included.
    pub by_type: Vec<(ApplicationType, usize)>,
    /// One entry per status, in lifecycle order, zero counts included.
    pub by_status: Vec<(ApplicationStatus, usize)>,
}

impl DashboardSummary {
    pub fn from_applications(apps: &[Application]) -> Self {
        let by_type = ApplicationType::ALL
            .into_iter()
            .map(|t| (t, apps.iter().filter(|a| a.application_type() == t).count()))
            .collect();
        let by_status = ApplicationStatus::ALL
            .into_iter()
            .map(|s| (s, apps.iter().filter(|a| a.status() == s).count()))
            .collect();
        Self {
            total: apps.len(),
            by_type,
            by_status,
        }
    }

    pub fn count_type(&self, t: ApplicationType) -> usize {
        self.by_type
            .iter()
            .find_map(|(k, n)| (*k == t).then_some(*n))
            .unwrap_or(0)
    }

    pub fn count_status(&self, s: ApplicationStatus) -> usize {
        self.by_status
            .iter()
            .find_map(|(k, n)| (*k == s).then_some(*n))
            .unwrap_or(0)
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub id: String,
    pub type_label: &'static str,
    pub exporter: String,
    /// Consignee company name, `N/A` when blank.
    pub consignee: String,
    /// Consignee country, `-` when blank.
    pub destination: String,
    pub created_at: NaiveDate,
    pub status_label: &'static str,
    pub editable: bool,
}

impl DashboardRow {
    pub fn from_application(app: &Application) -> Self {
        let consignee = app.consignee();
        Self {
            id: app.id().to_string(),
            type_label: app.application_type().label(),
            exporter: app.exporter().name.clone(),
            consignee: if consignee.company_name.is_empty() {
                "N/A".to_string()
            } else {
                consignee.company_name.to_string()
            },
            destination: if consignee.country.trim().is_empty() {
                "-".to_string()
            } else {
                consignee.country.clone()
            },
            created_at: app.created_at(),
            status_label: app.status().label(),
            editable: app.status() == ApplicationStatus::New,
        }
    }
}

pub fn summary<L: ListingService + ?Sized>(listing: &L) -> DashboardSummary {
    DashboardSummary::from_applications(&listing.list())
}

pub fn rows<L: ListingService + ?Sized>(listing: &L) -> Vec<DashboardRow> {
    listing.list().iter().map(DashboardRow::from_application).collect()
}

const HEADERS: [&str; 7] = [
    "ID",
    "Type",
    "Exporter / Consignee",
    "Destination",
    "Created",
    "Status",
    "Edit",
];

/// Plain-text table, one line per row, columns padded to the widest cell.
pub fn render_table(rows: &[DashboardRow]) -> String {
    if rows.is_empty() {
        return "No applications found.\n".to_string();
    }

    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|r| {
            [
                r.id.clone(),
                r.type_label.to_string(),
                format!("{} / {}", r.exporter, r.consignee),
                r.destination.clone(),
                r.created_at.format("%Y-%m-%d").to_string(),
                r.status_label.to_string(),
                if r.editable { "yes" } else { "locked" }.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        format!("{}\n", padded.join(" | ").trim_end())
    };

    let mut out = line(&HEADERS.map(str::to_string));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("-+-")));
    for row in &cells {
        out.push_str(&line(row));
    }
    out
}
