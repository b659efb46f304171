//! Assembled reference data shared by fits.
//!
//! A [`SourceData`] is the immutable output of the generator (or of a
//! [`SourceDataBuilder`] in tests): item types, attribute metadata and
//! effects, all id-keyed, wrapped in an `Arc` so any number of fits can
//! read it concurrently.

use crate::attr::Attribute;
use crate::defs::{AttrId, EffectId, TypeId};
use crate::effect::Effect;
use crate::item::ItemType;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable reference dataset.
#[derive(Debug, Default)]
pub struct SourceData {
    types: HashMap<TypeId, Arc<ItemType>>,
    attributes: HashMap<AttrId, Attribute>,
    effects: HashMap<EffectId, Arc<Effect>>,
    version: Option<String>,
}

impl SourceData {
    /// Look up an item type.
    pub fn item_type(&self, id: TypeId) -> Option<&Arc<ItemType>> {
        self.types.get(&id)
    }

    /// Look up attribute metadata.
    pub fn attribute(&self, id: AttrId) -> Option<&Attribute> {
        self.attributes.get(&id)
    }

    /// Look up an effect.
    pub fn effect(&self, id: EffectId) -> Option<&Arc<Effect>> {
        self.effects.get(&id)
    }

    /// Dataset version string, when the source reported one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Number of item types in the dataset.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

/// Builder for hand-assembled datasets.
///
/// # Examples
///
/// ```rust
/// use fitstat::{Attribute, ItemType, SourceDataBuilder};
///
/// let data = SourceDataBuilder::new()
///     .attribute(Attribute::new(1))
///     .item(ItemType::new(100, 4).attr(1, 50.0))
///     .build();
/// assert!(data.item_type(100).is_some());
/// ```
#[derive(Debug, Default)]
pub struct SourceDataBuilder {
    data: SourceData,
}

impl SourceDataBuilder {
    /// Start an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add attribute metadata.
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.data.attributes.insert(attr.id, attr);
        self
    }

    /// Add an item type.
    pub fn item(mut self, item: ItemType) -> Self {
        self.data.types.insert(item.id, Arc::new(item));
        self
    }

    /// Add an effect.
    pub fn effect(mut self, effect: Effect) -> Self {
        self.data.effects.insert(effect.id, Arc::new(effect));
        self
    }

    /// Set the dataset version string.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.data.version = Some(version.into());
        self
    }

    /// Finish, wrapping the dataset for sharing.
    pub fn build(self) -> Arc<SourceData> {
        Arc::new(self.data)
    }
}
