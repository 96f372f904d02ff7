//! Shipment manifest line items.

use serde::{Deserialize, Serialize};

use ecert_catalog::{PlantProduct, ProductId};
use ecert_core::{EnglishText, Entity, ItemId};

/// Intended use of the shipped plant material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemPurpose {
    #[default]
    Consumption,
    Propagation,
    Industrial,
    Sample,
}

/// Which packaging layer the package count refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageLayer {
    Inner,
    #[default]
    Outer,
}

/// One manifest line.
///
/// Product fields are frozen copies of the catalog entry taken at composition
/// time. There is no setter for any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    product_id: ProductId,
    product_name: String,
    scientific_name: String,
    purpose: ItemPurpose,
    quantity: f64,
    unit: String,
    net_weight: f64,
    value_thb: f64,
    packages: u32,
    package_unit: String,
    package_layer: PackageLayer,
    additional_details: EnglishText,
}

/// Editable part of an item, already validated and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemFields {
    pub purpose: ItemPurpose,
    pub quantity: f64,
    pub unit: String,
    pub net_weight: f64,
    pub value_thb: f64,
    pub packages: u32,
    pub package_unit: String,
    pub package_layer: PackageLayer,
    pub additional_details: EnglishText,
}

impl Item {
    pub(crate) fn from_product(id: ItemId, product: &PlantProduct, fields: ItemFields) -> Self {
        Self {
            id,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            scientific_name: product.scientific_name.clone(),
            purpose: fields.purpose,
            quantity: fields.quantity,
            unit: fields.unit,
            net_weight: fields.net_weight,
            value_thb: fields.value_thb,
            packages: fields.packages,
            package_unit: fields.package_unit,
            package_layer: fields.package_layer,
            additional_details: fields.additional_details,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn scientific_name(&self) -> &str {
        &self.scientific_name
    }

    pub fn purpose(&self) -> ItemPurpose {
        self.purpose
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Net weight in kilograms.
    pub fn net_weight(&self) -> f64 {
        self.net_weight
    }

    pub fn value_thb(&self) -> f64 {
        self.value_thb
    }

    pub fn packages(&self) -> u32 {
        self.packages
    }

    pub fn package_unit(&self) -> &str {
        &self.package_unit
    }

    pub fn package_layer(&self) -> PackageLayer {
        self.package_layer
    }

    pub fn additional_details(&self) -> &EnglishText {
        &self.additional_details
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
