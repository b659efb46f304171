//! Ordered sparse holder containers.
//!
//! Module racks and drone bays keep positional order; removing from the
//! middle leaves an empty slot, and explicit placement past the end pads
//! with empty slots. Trailing empties are always trimmed, so the length
//! reflects the last occupied slot.

use crate::error::ContainerError;
use crate::holder::HolderId;

/// Ordered container of holder handles with explicit empty slots.
///
/// # Examples
///
/// ```rust
/// use fitstat::{HolderId, HolderList};
///
/// let mut list = HolderList::new();
/// list.append(HolderId(1));
/// list.place(3, HolderId(2)).unwrap();
/// assert_eq!(list.len(), 4);
/// assert_eq!(list.get(1), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HolderList {
    slots: Vec<Option<HolderId>>,
}

impl HolderList {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, occupied or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the container has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Holder at the given slot, if the slot exists and is occupied.
    pub fn get(&self, index: usize) -> Option<HolderId> {
        self.slots.get(index).copied().flatten()
    }

    /// Iterate over occupied slots in positional order.
    pub fn holders(&self) -> impl Iterator<Item = HolderId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// Whether the holder is present.
    pub fn contains(&self, id: HolderId) -> bool {
        self.slots.contains(&Some(id))
    }

    /// Add a holder to the first slot past the end.
    pub fn append(&mut self, id: HolderId) {
        self.slots.push(Some(id));
    }

    /// Put a holder into a specific slot, padding with empty slots when
    /// the index is past the end.
    pub fn place(&mut self, index: usize, id: HolderId) -> Result<(), ContainerError> {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        } else if self.slots[index].is_some() {
            return Err(ContainerError::SlotTaken(index));
        }
        self.slots[index] = Some(id);
        Ok(())
    }

    /// Remove the first slot carrying the holder. The slot disappears and
    /// later holders shift down one position.
    pub fn remove(&mut self, id: HolderId) -> Result<(), ContainerError> {
        let index = self
            .slots
            .iter()
            .position(|slot| *slot == Some(id))
            .ok_or(ContainerError::NotFound)?;
        self.slots.remove(index);
        self.trim();
        Ok(())
    }

    /// Remove the slot at the given index, returning its occupant. An
    /// empty slot is a legal target and yields `None`.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<HolderId>, ContainerError> {
        if index >= self.slots.len() {
            return Err(ContainerError::IndexOutOfBounds {
                index,
                len: self.slots.len(),
            });
        }
        let removed = self.slots.remove(index);
        self.trim();
        Ok(removed)
    }

    /// Remove the first empty slot.
    pub fn remove_empty(&mut self) -> Result<(), ContainerError> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ContainerError::NotFound)?;
        self.slots.remove(index);
        self.trim();
        Ok(())
    }

    fn trim(&mut self) {
        while self.slots.last() == Some(&None) {
            self.slots.pop();
        }
    }
}
