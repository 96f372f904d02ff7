//! Item composer: catalog product + per-item details -> manifest line.

use rand::Rng;
use rand::rngs::ThreadRng;

use ecert_catalog::{CatalogProvider, PlantProduct, ProductId};
use ecert_core::{DomainError, DomainResult, EnglishText, Entity, ItemId};

use crate::item::{Item, ItemFields, ItemPurpose, PackageLayer};

pub const DEFAULT_UNIT: &str = "Unit";
pub const DEFAULT_PACKAGE_UNIT: &str = "Boxes";

/// Details entered for one item. Unset fields fall back to defaults, except
/// `net_weight`, which is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetails {
    pub purpose: Option<ItemPurpose>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub net_weight: Option<f64>,
    pub value_thb: Option<f64>,
    pub packages: Option<u32>,
    pub package_unit: Option<String>,
    pub package_layer: Option<PackageLayer>,
    pub additional_details: Option<String>,
}

impl ItemDetails {
    /// The state an item form opens in: every default filled, net weight 0.
    pub fn form_defaults() -> Self {
        Self {
            purpose: Some(ItemPurpose::Consumption),
            quantity: Some(1.0),
            unit: Some(DEFAULT_UNIT.to_string()),
            net_weight: Some(0.0),
            value_thb: Some(0.0),
            packages: Some(1),
            package_unit: Some(DEFAULT_PACKAGE_UNIT.to_string()),
            package_layer: Some(PackageLayer::Outer),
            additional_details: Some(String::new()),
        }
    }

    pub fn with_net_weight(mut self, kg: f64) -> Self {
        self.net_weight = Some(kg);
        self
    }

    pub fn with_quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_purpose(mut self, purpose: ItemPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn with_packages(mut self, count: u32, unit: impl Into<String>, layer: PackageLayer) -> Self {
        self.packages = Some(count);
        self.package_unit = Some(unit.into());
        self.package_layer = Some(layer);
        self
    }

    pub fn with_value_thb(mut self, value: f64) -> Self {
        self.value_thb = Some(value);
        self
    }

    pub fn with_additional_details(mut self, text: impl Into<String>) -> Self {
        self.additional_details = Some(text.into());
        self
    }
}

/// Finite and at least zero.
pub(crate) fn non_negative(name: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{name} must be a non-negative number (got {value})"
        )));
    }
    Ok(value)
}

/// Builds items with freshly generated ids.
#[derive(Debug)]
pub struct ItemComposer<R = ThreadRng> {
    rng: R,
}

impl ItemComposer<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for ItemComposer<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ItemComposer<R> {
    /// Use a specific RNG (seeded in tests).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn compose(&mut self, product: &PlantProduct, details: ItemDetails) -> DomainResult<Item> {
        let net_weight = details
            .net_weight
            .ok_or_else(|| DomainError::validation("net weight is required"))?;
        let net_weight = non_negative("net weight", net_weight)?;
        let quantity = non_negative("quantity", details.quantity.unwrap_or(1.0))?;
        let value_thb = non_negative("value (THB)", details.value_thb.unwrap_or(0.0))?;

        let fields = ItemFields {
            purpose: details.purpose.unwrap_or_default(),
            quantity,
            unit: details.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            net_weight,
            value_thb,
            packages: details.packages.unwrap_or(1),
            package_unit: details
                .package_unit
                .unwrap_or_else(|| DEFAULT_PACKAGE_UNIT.to_string()),
            package_layer: details.package_layer.unwrap_or_default(),
            additional_details: EnglishText::filtered(
                details.additional_details.as_deref().unwrap_or_default(),
            ),
        };

        let item = Item::from_product(ItemId::generate(&mut self.rng), product, fields);
        tracing::debug!(item_id = %item.id(), product_id = %product.id, "item composed");
        Ok(item)
    }

    /// Look the product up in the catalog first; unknown ids are `NotFound`.
    pub fn compose_from_catalog<C>(
        &mut self,
        catalog: &C,
        product_id: &ProductId,
        details: ItemDetails,
    ) -> DomainResult<Item>
    where
        C: CatalogProvider + ?Sized,
    {
        let product = catalog.find(product_id).ok_or_else(DomainError::not_found)?;
        self.compose(&product, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecert_catalog::InMemoryCatalog;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn durian() -> PlantProduct {
        PlantProduct::new("p2", "Durian (Monthong)", "Durio zibethinus").unwrap()
    }

    fn composer() -> ItemComposer<StdRng> {
        ItemComposer::with_rng(StdRng::seed_from_u64(99))
    }

    #[test]
    fn unset_fields_take_defaults() {
        let item = composer()
            .compose(&durian(), ItemDetails::default().with_net_weight(12.5))
            .unwrap();

        assert_eq!(item.purpose(), ItemPurpose::Consumption);
        assert_eq!(item.quantity(), 1.0);
        assert_eq!(item.unit(), "Unit");
        assert_eq!(item.packages(), 1);
        assert_eq!(item.package_unit(), "Boxes");
        assert_eq!(item.package_layer(), PackageLayer::Outer);
        assert_eq!(item.value_thb(), 0.0);
        assert_eq!(item.net_weight(), 12.5);
        assert!(item.additional_details().is_empty());
    }

    #[test]
    fn product_fields_are_copied() {
        let product = durian();
        let item = composer()
            .compose(&product, ItemDetails::form_defaults())
            .unwrap();

        assert_eq!(item.product_id(), &product.id);
        assert_eq!(item.product_name(), "Durian (Monthong)");
        assert_eq!(item.scientific_name(), "Durio zibethinus");
        assert_eq!(item.id().as_str().len(), 9);
    }

    #[test]
    fn missing_net_weight_is_rejected() {
        let err = composer()
            .compose(&durian(), ItemDetails::default())
            .unwrap_err();
        assert_eq!(err, DomainError::validation("net weight is required"));
    }

    #[test]
    fn invalid_net_weight_is_rejected() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let err = composer()
                .compose(&durian(), ItemDetails::default().with_net_weight(bad))
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "accepted {bad}");
        }
    }

    #[test]
    fn additional_details_are_uppercased_and_filtered() {
        let item = composer()
            .compose(
                &durian(),
                ItemDetails::form_defaults().with_additional_details("grade a (premium) – lot #4"),
            )
            .unwrap();
        assert_eq!(item.additional_details().as_str(), "GRADE A PREMIUM  LOT #4");
    }

    #[test]
    fn each_composition_gets_a_fresh_id() {
        let mut composer = composer();
        let a = composer.compose(&durian(), ItemDetails::form_defaults()).unwrap();
        let b = composer.compose(&durian(), ItemDetails::form_defaults()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn compose_from_catalog_requires_known_product() {
        let catalog = InMemoryCatalog::standard();
        let mut composer = composer();

        let item = composer
            .compose_from_catalog(&catalog, &ProductId::new("p5").unwrap(), ItemDetails::form_defaults())
            .unwrap();
        assert_eq!(item.scientific_name(), "Ananas comosus");

        let err = composer
            .compose_from_catalog(&catalog, &ProductId::new("p42").unwrap(), ItemDetails::form_defaults())
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }
}
