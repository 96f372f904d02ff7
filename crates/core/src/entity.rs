//! Entity trait: identity that survives edits to everything else.

/// An object owned by an aggregate and addressed by its own identifier
/// (e.g. a shipment line item inside an application).
pub trait Entity {
    type Id: Clone + Eq + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
