//! Error families.

use crate::defs::{AttrId, TypeId};
use crate::holder::HolderId;
use crate::restriction::RestrictionFailure;
use std::collections::HashMap;
use thiserror::Error;

/// Attribute calculation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// The holder handle refers to nothing on this fit.
    #[error("no such holder {0}")]
    NoSuchHolder(HolderId),
    /// The attribute has neither a base value nor an applicable default.
    #[error("holder {holder} has no value for attribute {attr}")]
    AttributeMissing {
        /// Holder the read was issued against.
        holder: HolderId,
        /// Attribute that could not be resolved.
        attr: AttrId,
    },
}

/// Ordered-container failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// The value is not present in the container.
    #[error("holder not found in container")]
    NotFound,
    /// The index is past the end of the container.
    #[error("index {index} out of bounds, container holds {len} slots")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Slot count at the time of the call.
        len: usize,
    },
    /// The slot already carries a holder.
    #[error("slot {0} is already taken")]
    SlotTaken(usize),
}

/// Fit mutation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The requested type is not in the dataset.
    #[error("unknown item type {0}")]
    UnknownType(TypeId),
    /// A container operation failed.
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// The holder handle refers to nothing on this fit.
    #[error("no such holder {0}")]
    NoSuchHolder(HolderId),
}

/// Aggregated outcome of fit validation: every failing holder with every
/// restriction it violates.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} holder(s) failed validation", failures.len())]
pub struct ValidationError {
    /// Violations per failing holder.
    pub failures: HashMap<HolderId, Vec<RestrictionFailure>>,
}
