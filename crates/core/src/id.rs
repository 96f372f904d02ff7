//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an application, e.g. `APP-2024-4821`.
///
/// Shape: `{PREFIX}-{YEAR}-{DIGITS}` with an uppercase alphabetic prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

/// Identifier of a shipment line item: a 9-character base-36 token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

const ITEM_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

impl_string_newtype!(ApplicationId);
impl_string_newtype!(ItemId);

impl ApplicationId {
    /// Generate `{prefix}-{year}-{NNNN}` with a random suffix in 1000..=9999.
    pub fn generate<R: Rng + ?Sized>(prefix: &str, year: i32, rng: &mut R) -> Self {
        let suffix: u16 = rng.gen_range(1000..=9999);
        Self(format!("{prefix}-{year}-{suffix}"))
    }

    /// The alphabetic prefix (`APP`, `REX`, ...).
    pub fn prefix(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }
}

impl FromStr for ApplicationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let well_formed = match parts.as_slice() {
            [prefix, year, suffix] => {
                !prefix.is_empty()
                    && prefix.chars().all(|c| c.is_ascii_uppercase())
                    && year.len() == 4
                    && year.chars().all(|c| c.is_ascii_digit())
                    && !suffix.is_empty()
                    && suffix.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        };

        if !well_formed {
            return Err(DomainError::invalid_id(format!(
                "ApplicationId: expected PREFIX-YYYY-NNNN, got '{s}'"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl ItemId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let token = (0..ITEM_ID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(token)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::invalid_id(format!(
                "ItemId: expected alphanumeric token, got '{s}'"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_application_id_has_prefix_year_and_four_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = ApplicationId::generate("REX", 2024, &mut rng);

        assert!(id.as_str().starts_with("REX-2024-"));
        let suffix: u32 = id.as_str()[9..].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
        assert_eq!(id.prefix(), "REX");
    }

    #[test]
    fn application_id_parses_legacy_short_suffix() {
        let id: ApplicationId = "APP-2024-001".parse().unwrap();
        assert_eq!(id.as_str(), "APP-2024-001");
    }

    #[test]
    fn application_id_rejects_malformed_input() {
        for raw in ["", "APP-24-1234", "app-2024-1234", "APP-2024-", "APP-2024-12a4"] {
            let err = raw.parse::<ApplicationId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn item_id_is_nine_base36_chars() {
        let mut rng = StdRng::seed_from_u64(42);
        let id = ItemId::generate(&mut rng);

        assert_eq!(id.as_str().len(), 9);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn item_ids_do_not_repeat_in_practice() {
        let mut rng = StdRng::seed_from_u64(1);
        let ids: std::collections::HashSet<ItemId> =
            (0..1000).map(|_| ItemId::generate(&mut rng)).collect();
        assert_eq!(ids.len(), 1000);
    }
}
