//! Holders: item instances living on a fit.

use crate::defs::{Location, State};
use crate::item::ItemType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle to a holder within its fit's holder table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HolderId(pub u32);

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role a holder plays on its fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolderKind {
    /// The hull.
    Ship,
    /// The pilot.
    Character,
    /// A fitted module.
    Module,
    /// A drone in space.
    Drone,
    /// A charge loaded into a module.
    Charge,
    /// An implant plugged into the character.
    Implant,
    /// A trained skill.
    Skill,
}

impl HolderKind {
    /// Physical location this kind of holder occupies.
    pub fn location(self) -> Location {
        match self {
            HolderKind::Ship | HolderKind::Module | HolderKind::Charge => Location::Ship,
            HolderKind::Drone => Location::Space,
            HolderKind::Character | HolderKind::Implant | HolderKind::Skill => Location::Character,
        }
    }
}

/// One item instance on a fit.
///
/// Holders live in the fit's holder table and refer to each other by
/// [`HolderId`]; the module/charge pairing is a pair of such handles.
#[derive(Debug, Clone)]
pub struct Holder {
    /// Handle of this holder.
    pub id: HolderId,
    /// Role on the fit.
    pub kind: HolderKind,
    /// The item type this holder instantiates.
    pub item: Arc<ItemType>,
    /// Current activation state.
    pub state: State,
    /// For modules: the loaded charge.
    pub charge: Option<HolderId>,
    /// For charges: the module carrying them.
    pub container: Option<HolderId>,
}

impl Holder {
    /// The module/charge counterpart, whichever side this holder is on.
    pub fn other(&self) -> Option<HolderId> {
        self.charge.or(self.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_locations() {
        assert_eq!(HolderKind::Ship.location(), Location::Ship);
        assert_eq!(HolderKind::Module.location(), Location::Ship);
        assert_eq!(HolderKind::Charge.location(), Location::Ship);
        assert_eq!(HolderKind::Drone.location(), Location::Space);
        assert_eq!(HolderKind::Implant.location(), Location::Character);
        assert_eq!(HolderKind::Skill.location(), Location::Character);
        assert_eq!(HolderKind::Character.location(), Location::Character);
    }
}
