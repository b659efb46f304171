//! Shared identifiers and fundamental enumerations.
//!
//! All reference-data entities are keyed by plain numeric ids mirroring the
//! relational schema the dataset is loaded from. Holders and fits use their
//! own handle types (see [`crate::holder`] and [`crate::fleet`]).

use serde::{Deserialize, Serialize};

/// Attribute identifier.
pub type AttrId = u32;
/// Item type identifier.
pub type TypeId = u32;
/// Item group identifier.
pub type GroupId = u32;
/// Effect identifier.
pub type EffectId = u32;

/// Activation state of a holder.
///
/// States form a total order: a modifier requiring some state applies as
/// long as its carrying holder is in that state *or higher*.
///
/// # Examples
///
/// ```rust
/// use fitstat::State;
///
/// assert!(State::Offline < State::Online);
/// assert!(State::Active >= State::Online);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum State {
    /// Fitted but not powered.
    Offline,
    /// Powered but idle.
    Online,
    /// Running its active cycle.
    Active,
    /// Overloaded operation.
    Overload,
}

/// Physical location of a holder within a fit.
///
/// Filtered modifications ("all items on ship", "all drones of group X")
/// resolve against these buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    /// The character and everything attached to it (implants, skills).
    Character,
    /// The ship hull and everything fitted to it (modules, charges).
    Ship,
    /// Items deployed into space (drones).
    Space,
}

/// Well-known attribute ids used by restrictions and fit statistics.
///
/// The engine itself is attribute-agnostic; only the restriction registers
/// and the stat tracker give meaning to specific ids.
pub mod attrs {
    use super::AttrId;

    /// Multiplier applied to a weapon's or drone's damage attributes.
    pub const DAMAGE_MULTIPLIER: AttrId = 64;
    /// Electromagnetic damage per shot.
    pub const EM_DAMAGE: AttrId = 114;
    /// Explosive damage per shot.
    pub const EXPLOSIVE_DAMAGE: AttrId = 116;
    /// Kinetic damage per shot.
    pub const KINETIC_DAMAGE: AttrId = 117;
    /// Thermal damage per shot.
    pub const THERMAL_DAMAGE: AttrId = 118;
    /// First drone group a ship allows into its bay.
    pub const ALLOWED_DRONE_GROUP_1: AttrId = 1782;
    /// Second drone group a ship allows into its bay.
    pub const ALLOWED_DRONE_GROUP_2: AttrId = 1783;
    /// Drone bandwidth a ship provides.
    pub const DRONE_BANDWIDTH: AttrId = 1271;
    /// Drone bandwidth a drone consumes while online.
    pub const DRONE_BANDWIDTH_USED: AttrId = 1272;
    /// Required-skill attribute slots on item types.
    pub const REQUIRED_SKILLS: [AttrId; 6] = [182, 183, 184, 1285, 1289, 1290];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(State::Offline < State::Online);
        assert!(State::Online < State::Active);
        assert!(State::Active < State::Overload);
    }

    #[test]
    fn test_state_requirement_check() {
        // A holder in Active state satisfies Online requirements.
        assert!(State::Active >= State::Online);
        assert!(!(State::Offline >= State::Online));
    }
}
