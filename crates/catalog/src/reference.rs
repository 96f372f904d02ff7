//! Static reference lists used by the application form.

use serde::Serialize;

/// Destination/origin countries, alphabetical.
pub const COUNTRIES: &[&str] = &[
    "Australia",
    "China",
    "France",
    "Germany",
    "Italy",
    "Japan",
    "Malaysia",
    "Netherlands",
    "Singapore",
    "USA",
    "United Kingdom",
    "Vietnam",
];

pub const TRANSPORT_MEANS: &[&str] = &[
    "Sea Freight",
    "Air Freight",
    "Road Transport",
    "Rail Transport",
];

pub const PACKAGE_UNITS: &[&str] = &["Cartons", "Boxes", "Pallets", "Bags", "Crates", "Units"];

/// A plant quarantine station that can issue certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantineStation {
    pub id: &'static str,
    pub name: &'static str,
}

pub const QUARANTINE_STATIONS: &[QuarantineStation] = &[
    QuarantineStation {
        id: "1",
        name: "Don Mueang Plant Quarantine Station",
    },
    QuarantineStation {
        id: "2",
        name: "Suvarnabhumi Plant Quarantine Station",
    },
    QuarantineStation {
        id: "3",
        name: "Laem Chabang Plant Quarantine Station",
    },
    QuarantineStation {
        id: "4",
        name: "Bangkok Port Plant Quarantine Station",
    },
];

/// Borrowed view over the reference lists.
///
/// Validation code takes this instead of the constants so tests can narrow the
/// lists.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceData {
    pub countries: &'static [&'static str],
    pub transport_means: &'static [&'static str],
    pub package_units: &'static [&'static str],
    pub stations: &'static [QuarantineStation],
}

impl ReferenceData {
    pub const fn standard() -> Self {
        Self {
            countries: COUNTRIES,
            transport_means: TRANSPORT_MEANS,
            package_units: PACKAGE_UNITS,
            stations: QUARANTINE_STATIONS,
        }
    }

    pub fn station(&self, id: &str) -> Option<&QuarantineStation> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn is_country(&self, name: &str) -> bool {
        self.countries.contains(&name)
    }

    pub fn is_transport_means(&self, name: &str) -> bool {
        self.transport_means.contains(&name)
    }

    pub fn is_package_unit(&self, name: &str) -> bool {
        self.package_units.contains(&name)
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countries_are_sorted() {
        let mut sorted = COUNTRIES.to_vec();
        sorted.sort();
        assert_eq!(sorted, COUNTRIES);
    }

    #[test]
    fn station_lookup() {
        let reference = ReferenceData::standard();
        assert_eq!(
            reference.station("3").map(|s| s.name),
            Some("Laem Chabang Plant Quarantine Station")
        );
        assert!(reference.station("9").is_none());
    }

    #[test]
    fn membership_checks() {
        let reference = ReferenceData::default();
        assert!(reference.is_country("Japan"));
        assert!(!reference.is_country("Atlantis"));
        assert!(reference.is_transport_means("Air Freight"));
        assert!(reference.is_package_unit("Pallets"));
    }
}
