//! Fit validation.
//!
//! Restriction registers watch holders as they enter and leave the fit
//! and, on demand, report every violation at once. Validation never
//! interrupts fitting: an invalid fit still calculates.

use crate::defs::{attrs, GroupId};
use crate::error::ValidationError;
use crate::holder::{Holder, HolderId, HolderKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Read access a register gets during validation.
pub struct RestrictionContext<'a> {
    /// The fit's holder table.
    pub holders: &'a BTreeMap<HolderId, Holder>,
    /// The current ship holder, if set.
    pub ship: Option<&'a Holder>,
}

/// One restriction violation on one holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionFailure {
    /// The drone's group is not among those the ship allows.
    DroneGroup {
        /// Group of the offending drone.
        group: GroupId,
        /// Groups the ship allows. Empty means the ship allows none.
        allowed_groups: Vec<GroupId>,
    },
}

/// One restriction rule, tracking the holders it cares about.
pub trait RestrictionRegister {
    /// A holder entered the fit.
    fn register_holder(&mut self, holder: &Holder);
    /// A holder left the fit.
    fn unregister_holder(&mut self, id: HolderId);
    /// Report every violation among tracked holders.
    fn validate(&self, ctx: &RestrictionContext<'_>) -> HashMap<HolderId, RestrictionFailure>;
    /// Number of holders currently tracked, for teardown checks.
    fn tracked_count(&self) -> usize;
}

/// Restricts drones to the groups the ship hull allows.
///
/// The allowed groups are read from the ship's original item attributes,
/// not its modified values, so the restriction cannot be relaxed by
/// modifiers. A ship with no allowed-group attributes allows every
/// drone, and so does an absent ship.
#[derive(Debug, Default)]
pub struct DroneGroupRegister {
    drones: Vec<HolderId>,
}

impl RestrictionRegister for DroneGroupRegister {
    fn register_holder(&mut self, holder: &Holder) {
        if holder.kind == HolderKind::Drone {
            self.drones.push(holder.id);
        }
    }

    fn unregister_holder(&mut self, id: HolderId) {
        self.drones.retain(|d| *d != id);
    }

    fn validate(&self, ctx: &RestrictionContext<'_>) -> HashMap<HolderId, RestrictionFailure> {
        let mut failures = HashMap::new();
        let Some(ship) = ctx.ship else {
            return failures;
        };
        let allowed: Vec<GroupId> = [attrs::ALLOWED_DRONE_GROUP_1, attrs::ALLOWED_DRONE_GROUP_2]
            .iter()
            .filter_map(|attr| ship.item.attrs.get(attr))
            .map(|v| *v as GroupId)
            .collect();
        if allowed.is_empty() {
            return failures;
        }
        for id in &self.drones {
            let Some(drone) = ctx.holders.get(id) else {
                continue;
            };
            if !allowed.contains(&drone.item.group_id) {
                failures.insert(
                    *id,
                    RestrictionFailure::DroneGroup {
                        group: drone.item.group_id,
                        allowed_groups: allowed.clone(),
                    },
                );
            }
        }
        failures
    }

    fn tracked_count(&self) -> usize {
        self.drones.len()
    }
}

/// Runs every register and merges their findings per holder.
#[derive(Default)]
pub struct RestrictionTracker {
    registers: Vec<Box<dyn RestrictionRegister>>,
}

impl std::fmt::Debug for RestrictionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictionTracker")
            .field("registers", &self.registers.len())
            .finish()
    }
}

impl RestrictionTracker {
    /// Create a tracker with the standard registers.
    pub fn new() -> Self {
        let registers: Vec<Box<dyn RestrictionRegister>> =
            vec![Box::new(DroneGroupRegister::default())];
        Self { registers }
    }

    /// Feed a new holder to every register.
    pub fn register_holder(&mut self, holder: &Holder) {
        for register in &mut self.registers {
            register.register_holder(holder);
        }
    }

    /// Withdraw a holder from every register.
    pub fn unregister_holder(&mut self, id: HolderId) {
        for register in &mut self.registers {
            register.unregister_holder(id);
        }
    }

    /// Run validation; `Ok(())` when no register reports a violation.
    pub fn validate(&self, ctx: &RestrictionContext<'_>) -> Result<(), ValidationError> {
        let mut failures: HashMap<HolderId, Vec<RestrictionFailure>> = HashMap::new();
        for register in &self.registers {
            for (id, failure) in register.validate(ctx) {
                failures.entry(id).or_default().push(failure);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { failures })
        }
    }

    /// Total holders tracked across registers.
    pub fn tracked_count(&self) -> usize {
        self.registers.iter().map(|r| r.tracked_count()).sum()
    }
}
