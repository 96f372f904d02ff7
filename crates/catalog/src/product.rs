use serde::{Deserialize, Serialize};

use ecert_core::{DomainError, DomainResult};

/// Catalog product identifier (e.g. `p1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::invalid_id("ProductId cannot be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plant product that can appear on a phytosanitary certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantProduct {
    pub id: ProductId,
    /// Common (trade) name, e.g. "Durian (Monthong)".
    pub name: String,
    pub scientific_name: String,
}

impl PlantProduct {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        scientific_name: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let scientific_name = scientific_name.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if scientific_name.trim().is_empty() {
            return Err(DomainError::validation("scientific name cannot be empty"));
        }

        Ok(Self {
            id: ProductId::new(id)?,
            name,
            scientific_name,
        })
    }

    /// Case-insensitive substring match over common or scientific name.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.scientific_name.to_lowercase().contains(&needle)
    }
}

/// Read-only source of plant products.
pub trait CatalogProvider: Send + Sync {
    /// All products, in catalog order.
    fn list_products(&self) -> Vec<PlantProduct>;

    /// Products whose common or scientific name contains `term`
    /// (case-insensitive). An empty term returns the whole catalog.
    fn search(&self, term: &str) -> Vec<PlantProduct> {
        self.list_products()
            .into_iter()
            .filter(|p| p.matches(term))
            .collect()
    }

    fn find(&self, id: &ProductId) -> Option<PlantProduct> {
        self.list_products().into_iter().find(|p| &p.id == id)
    }
}

impl<C> CatalogProvider for std::sync::Arc<C>
where
    C: CatalogProvider + ?Sized,
{
    fn list_products(&self) -> Vec<PlantProduct> {
        (**self).list_products()
    }

    fn search(&self, term: &str) -> Vec<PlantProduct> {
        (**self).search(term)
    }

    fn find(&self, id: &ProductId) -> Option<PlantProduct> {
        (**self).find(id)
    }
}

/// Fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<PlantProduct>,
}

impl InMemoryCatalog {
    /// Build a catalog; duplicate product ids are rejected.
    pub fn new(products: Vec<PlantProduct>) -> DomainResult<Self> {
        for (i, product) in products.iter().enumerate() {
            if products[..i].iter().any(|p| p.id == product.id) {
                return Err(DomainError::conflict(format!(
                    "duplicate product id '{}'",
                    product.id
                )));
            }
        }
        Ok(Self { products })
    }

    /// The standard export catalog of Thai plant products.
    pub fn standard() -> Self {
        let products = [
            ("p1", "Mango (Nam Dok Mai)", "Mangifera indica"),
            ("p2", "Durian (Monthong)", "Durio zibethinus"),
            ("p3", "Thai Jasmine Rice", "Oryza sativa"),
            ("p4", "Orchid (Dendrobium)", "Dendrobium spp."),
            ("p5", "Pineapple", "Ananas comosus"),
            ("p6", "Banana (Cavendish)", "Musa acuminata"),
            ("p7", "Mangosteen", "Garcinia mangostana"),
        ]
        .into_iter()
        .map(|(id, name, scientific)| PlantProduct {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            scientific_name: scientific.to_string(),
        })
        .collect();

        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn list_products(&self) -> Vec<PlantProduct> {
        self.products.clone()
    }

    fn search(&self, term: &str) -> Vec<PlantProduct> {
        let hits: Vec<PlantProduct> = self
            .products
            .iter()
            .filter(|p| p.matches(term))
            .cloned()
            .collect();
        tracing::debug!(term, hits = hits.len(), "catalog search");
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_common_name_case_insensitively() {
        let catalog = InMemoryCatalog::standard();
        let hits = catalog.search("MANGO");
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        // "Mango (Nam Dok Mai)" and "Mangosteen"
        assert_eq!(ids, vec!["p1", "p7"]);
    }

    #[test]
    fn search_matches_scientific_name() {
        let catalog = InMemoryCatalog::standard();
        let hits = catalog.search("oryza");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Thai Jasmine Rice");
    }

    #[test]
    fn empty_term_returns_whole_catalog_in_order() {
        let catalog = InMemoryCatalog::standard();
        assert_eq!(catalog.search("  "), catalog.list_products());
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn unknown_term_returns_nothing() {
        let catalog = InMemoryCatalog::standard();
        assert!(catalog.search("kiwi").is_empty());
    }

    #[test]
    fn find_by_id() {
        let catalog = InMemoryCatalog::standard();
        let id = ProductId::new("p2").unwrap();
        let durian = catalog.find(&id).unwrap();
        assert_eq!(durian.scientific_name, "Durio zibethinus");
        assert!(catalog.find(&ProductId::new("p99").unwrap()).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = PlantProduct::new("x", "Lychee", "Litchi chinensis").unwrap();
        let b = PlantProduct::new("x", "Longan", "Dimocarpus longan").unwrap();
        let err = InMemoryCatalog::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn product_requires_names() {
        let err = PlantProduct::new("p9", " ", "Litchi chinensis").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = PlantProduct::new("", "Lychee", "Litchi chinensis").unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: search never invents products and keeps catalog order.
            #[test]
            fn search_is_an_ordered_subset(term in "[A-Za-z ]{0,8}") {
                let catalog = InMemoryCatalog::standard();
                let all = catalog.list_products();
                let hits = catalog.search(&term);

                let mut cursor = all.iter();
                for hit in &hits {
                    prop_assert!(hit.matches(&term));
                    prop_assert!(cursor.any(|p| p == hit), "hit out of order: {:?}", hit.id);
                }
            }

            /// Property: search ignores case.
            #[test]
            fn search_is_case_insensitive(term in "[A-Za-z]{1,6}") {
                let catalog = InMemoryCatalog::standard();
                prop_assert_eq!(
                    catalog.search(&term.to_uppercase()),
                    catalog.search(&term.to_lowercase())
                );
            }
        }
    }
}
