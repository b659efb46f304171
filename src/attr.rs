//! Attribute metadata.
//!
//! Describes how an attribute behaves during calculation: whether larger
//! values are an improvement, whether multiple multiplicative modifiers
//! stack freely, and the value assumed when an item type carries no base.

use crate::defs::AttrId;
use serde::{Deserialize, Serialize};

/// Static metadata for one attribute.
///
/// Immutable and shared by every holder referencing the attribute.
///
/// # Examples
///
/// ```rust
/// use fitstat::Attribute;
///
/// let attr = Attribute::new(1);
/// assert!(attr.high_is_good);
/// assert!(attr.stackable);
///
/// let penalized = Attribute::new(2).stackable(false);
/// assert!(!penalized.stackable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute id.
    pub id: AttrId,
    /// Whether a higher value is an improvement. Decides which candidate
    /// wins among competing assignment modifiers.
    pub high_is_good: bool,
    /// Whether multiplicative modifiers stack without penalty.
    pub stackable: bool,
    /// Base value assumed when an item type has no entry for this attribute.
    pub default_value: Option<f64>,
}

impl Attribute {
    /// Create metadata with the conventional defaults: high is good,
    /// freely stackable, no default value.
    pub fn new(id: AttrId) -> Self {
        Self {
            id,
            high_is_good: true,
            stackable: true,
            default_value: None,
        }
    }

    /// Set whether a higher value is an improvement.
    pub fn high_is_good(mut self, flag: bool) -> Self {
        self.high_is_good = flag;
        self
    }

    /// Set whether multiplicative modifiers stack without penalty.
    pub fn stackable(mut self, flag: bool) -> Self {
        self.stackable = flag;
        self
    }

    /// Set the default base value.
    pub fn default_value(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }
}
