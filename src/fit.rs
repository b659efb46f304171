//! The fit: one ship, one pilot, and everything fitted to them.
//!
//! The fit owns the holder table and every derived structure (affection
//! register, value cache, restriction tracker, stat tracker) and is the
//! sole mutation entry point, so the structures can never disagree.
//! Reads are pull-based: nothing is computed until [`Fit::attr`] asks.

use crate::calc::{self, AttrCache, CalcCtx, CalcNode, ExternalAffector, ExternalTarget};
use crate::container::HolderList;
use crate::data::SourceData;
use crate::defs::{attrs, AttrId, State, TypeId};
use crate::diag::DiagnosticsSink;
use crate::error::{CalcError, FitError, ValidationError};
use crate::holder::{Holder, HolderId, HolderKind};
use crate::modifier::{Modifier, Scope};
use crate::registry::AffectionRegister;
use crate::restriction::{RestrictionContext, RestrictionTracker};
use crate::stats::{DroneBandwidth, ResistanceProfile, StatTracker, Volley};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// One fit against one dataset.
///
/// # Examples
///
/// ```rust
/// use fitstat::{Attribute, Fit, ItemType, SourceDataBuilder};
///
/// let data = SourceDataBuilder::new()
///     .attribute(Attribute::new(9))
///     .item(ItemType::new(100, 4).attr(9, 500.0))
///     .build();
/// let mut fit = Fit::new(data);
/// let ship = fit.set_ship(100).unwrap();
/// assert_eq!(fit.attr(ship, 9).unwrap(), 500.0);
/// ```
#[derive(Debug)]
pub struct Fit {
    data: Arc<SourceData>,
    holders: BTreeMap<HolderId, Holder>,
    next_id: u32,
    ship: Option<HolderId>,
    character: Option<HolderId>,
    modules: HolderList,
    drones: HolderList,
    implants: Vec<HolderId>,
    skills: Vec<HolderId>,
    register: AffectionRegister,
    cache: AttrCache,
    restrictions: RestrictionTracker,
    stats: StatTracker,
    externals: Vec<ExternalAffector>,
    diag: Rc<DiagnosticsSink>,
}

impl Fit {
    /// Create an empty fit with its own diagnostics sink.
    pub fn new(data: Arc<SourceData>) -> Self {
        Self::with_diagnostics(data, Rc::new(DiagnosticsSink::new()))
    }

    /// Create an empty fit reporting into a shared sink.
    pub fn with_diagnostics(data: Arc<SourceData>, diag: Rc<DiagnosticsSink>) -> Self {
        Self {
            data,
            holders: BTreeMap::new(),
            next_id: 1,
            ship: None,
            character: None,
            modules: HolderList::new(),
            drones: HolderList::new(),
            implants: Vec::new(),
            skills: Vec::new(),
            register: AffectionRegister::default(),
            cache: AttrCache::default(),
            restrictions: RestrictionTracker::new(),
            stats: StatTracker::default(),
            externals: Vec::new(),
            diag,
        }
    }

    /// The diagnostics sink this fit reports into.
    pub fn diagnostics(&self) -> &DiagnosticsSink {
        &self.diag
    }

    /// The dataset the fit was built against.
    pub fn data(&self) -> &Arc<SourceData> {
        &self.data
    }

    /// Current ship holder.
    pub fn ship(&self) -> Option<HolderId> {
        self.ship
    }

    /// Current character holder.
    pub fn character(&self) -> Option<HolderId> {
        self.character
    }

    /// Look up a holder.
    pub fn holder(&self, id: HolderId) -> Option<&Holder> {
        self.holders.get(&id)
    }

    /// The module rack.
    pub fn modules(&self) -> &HolderList {
        &self.modules
    }

    /// The drone bay.
    pub fn drones(&self) -> &HolderList {
        &self.drones
    }

    // ----- roots -----

    /// Set (or replace) the ship. Replacing discharges the old hull and
    /// everything cached from it.
    pub fn set_ship(&mut self, type_id: TypeId) -> Result<HolderId, FitError> {
        if self.data.item_type(type_id).is_none() {
            return Err(FitError::UnknownType(type_id));
        }
        if let Some(old) = self.ship {
            self.discharge(old);
            self.holders.remove(&old);
            self.ship = None;
        }
        let id = self.spawn(type_id, HolderKind::Ship, State::Offline)?;
        // Root handle must be set before enrollment so ship-domain
        // modifiers resolve against the new hull.
        self.ship = Some(id);
        self.enroll(id);
        Ok(id)
    }

    /// Remove the ship, if one is set.
    pub fn remove_ship(&mut self) {
        if let Some(old) = self.ship {
            self.discharge(old);
            self.holders.remove(&old);
            self.ship = None;
        }
    }

    /// Set (or replace) the character.
    pub fn set_character(&mut self, type_id: TypeId) -> Result<HolderId, FitError> {
        if self.data.item_type(type_id).is_none() {
            return Err(FitError::UnknownType(type_id));
        }
        if let Some(old) = self.character {
            self.discharge(old);
            self.holders.remove(&old);
            self.character = None;
        }
        let id = self.spawn(type_id, HolderKind::Character, State::Offline)?;
        self.character = Some(id);
        self.enroll(id);
        Ok(id)
    }

    /// Remove the character, if one is set.
    pub fn remove_character(&mut self) {
        if let Some(old) = self.character {
            self.discharge(old);
            self.holders.remove(&old);
            self.character = None;
        }
    }

    // ----- modules -----

    /// Fit a module to the first free slot past the end of the rack.
    pub fn add_module(&mut self, type_id: TypeId, state: State) -> Result<HolderId, FitError> {
        let id = self.spawn(type_id, HolderKind::Module, state)?;
        self.modules.append(id);
        self.enroll(id);
        Ok(id)
    }

    /// Fit a module to a specific slot, padding the rack if needed.
    pub fn add_module_at(
        &mut self,
        index: usize,
        type_id: TypeId,
        state: State,
    ) -> Result<HolderId, FitError> {
        let id = self.spawn(type_id, HolderKind::Module, state)?;
        if let Err(err) = self.modules.place(index, id) {
            self.holders.remove(&id);
            return Err(err.into());
        }
        self.enroll(id);
        Ok(id)
    }

    /// Unfit a module. Its loaded charge, if any, goes with it.
    pub fn remove_module(&mut self, id: HolderId) -> Result<(), FitError> {
        self.modules.remove(id)?;
        self.despawn_module(id);
        Ok(())
    }

    /// Unfit whatever occupies a rack slot; an empty slot just closes.
    pub fn remove_module_at(&mut self, index: usize) -> Result<Option<HolderId>, FitError> {
        let removed = self.modules.remove_at(index)?;
        if let Some(id) = removed {
            self.despawn_module(id);
        }
        Ok(removed)
    }

    /// Close the first empty rack slot.
    pub fn remove_module_gap(&mut self) -> Result<(), FitError> {
        self.modules.remove_empty()?;
        Ok(())
    }

    // ----- charges -----

    /// Load a charge into a module. A previously loaded charge is
    /// unloaded first. The charge tracks the module's state.
    pub fn set_charge(&mut self, module: HolderId, type_id: TypeId) -> Result<HolderId, FitError> {
        let state = match self.holders.get(&module) {
            Some(h) if h.kind == HolderKind::Module => h.state,
            _ => return Err(FitError::NoSuchHolder(module)),
        };
        // Reject an unknown type before unloading anything: a failed
        // load must leave the module exactly as it was.
        if self.data.item_type(type_id).is_none() {
            return Err(FitError::UnknownType(type_id));
        }
        self.remove_charge(module)?;
        let id = self.spawn(type_id, HolderKind::Charge, state)?;
        if let Some(charge) = self.holders.get_mut(&id) {
            charge.container = Some(module);
        }
        if let Some(m) = self.holders.get_mut(&module) {
            m.charge = Some(id);
        }
        self.enroll(id);
        // The module's counterpart modifiers have a target now.
        self.invalidate_for_affector(module);
        Ok(id)
    }

    /// Unload the module's charge, if one is loaded.
    pub fn remove_charge(&mut self, module: HolderId) -> Result<(), FitError> {
        let charge = match self.holders.get(&module) {
            Some(h) => h.charge,
            None => return Err(FitError::NoSuchHolder(module)),
        };
        let Some(charge) = charge else {
            return Ok(());
        };
        self.invalidate_for_affector(module);
        self.discharge(charge);
        self.holders.remove(&charge);
        if let Some(m) = self.holders.get_mut(&module) {
            m.charge = None;
        }
        Ok(())
    }

    // ----- drones -----

    /// Put a drone into the bay.
    pub fn add_drone(&mut self, type_id: TypeId, state: State) -> Result<HolderId, FitError> {
        let id = self.spawn(type_id, HolderKind::Drone, state)?;
        self.drones.append(id);
        self.enroll(id);
        Ok(id)
    }

    /// Remove a drone from the bay.
    pub fn remove_drone(&mut self, id: HolderId) -> Result<(), FitError> {
        self.drones.remove(id)?;
        self.discharge(id);
        self.holders.remove(&id);
        Ok(())
    }

    // ----- character-side holders -----

    /// Plug in an implant.
    pub fn add_implant(&mut self, type_id: TypeId) -> Result<HolderId, FitError> {
        let id = self.spawn(type_id, HolderKind::Implant, State::Offline)?;
        self.implants.push(id);
        self.enroll(id);
        Ok(id)
    }

    /// Unplug an implant.
    pub fn remove_implant(&mut self, id: HolderId) -> Result<(), FitError> {
        if !self.implants.contains(&id) {
            return Err(FitError::NoSuchHolder(id));
        }
        self.implants.retain(|i| *i != id);
        self.discharge(id);
        self.holders.remove(&id);
        Ok(())
    }

    /// Add a trained skill.
    pub fn add_skill(&mut self, type_id: TypeId) -> Result<HolderId, FitError> {
        let id = self.spawn(type_id, HolderKind::Skill, State::Offline)?;
        self.skills.push(id);
        self.enroll(id);
        Ok(id)
    }

    /// Remove a trained skill.
    pub fn remove_skill(&mut self, id: HolderId) -> Result<(), FitError> {
        if !self.skills.contains(&id) {
            return Err(FitError::NoSuchHolder(id));
        }
        self.skills.retain(|s| *s != id);
        self.discharge(id);
        self.holders.remove(&id);
        Ok(())
    }

    // ----- state and projection -----

    /// Change a holder's activation state. A module's loaded charge
    /// follows the module.
    pub fn set_state(&mut self, id: HolderId, state: State) -> Result<(), FitError> {
        let charge = match self.holders.get_mut(&id) {
            Some(holder) => {
                holder.state = state;
                holder.charge
            }
            None => return Err(FitError::NoSuchHolder(id)),
        };
        self.invalidate_for_affector(id);
        if let Some(charge) = charge {
            if let Some(holder) = self.holders.get_mut(&charge) {
                holder.state = state;
            }
            self.invalidate_for_affector(charge);
        }
        Ok(())
    }

    /// Project one holder's targeted modifiers onto another holder of
    /// the same fit.
    pub fn project(&mut self, source: HolderId, target: HolderId) -> Result<(), FitError> {
        if !self.holders.contains_key(&source) {
            return Err(FitError::NoSuchHolder(source));
        }
        if !self.holders.contains_key(&target) {
            return Err(FitError::NoSuchHolder(target));
        }
        self.register.add_projection(source, target);
        self.invalidate_for_affector(source);
        Ok(())
    }

    /// Withdraw a projection.
    pub fn unproject(&mut self, source: HolderId, target: HolderId) -> Result<(), FitError> {
        if !self.holders.contains_key(&source) {
            return Err(FitError::NoSuchHolder(source));
        }
        // Invalidate while the projection still resolves its targets.
        self.invalidate_for_affector(source);
        self.register.remove_projection(source, target);
        Ok(())
    }

    // ----- reads -----

    /// Modified value of an attribute on a holder.
    pub fn attr(&mut self, holder: HolderId, attr: AttrId) -> Result<f64, CalcError> {
        let Fit {
            holders,
            register,
            data,
            ship,
            character,
            externals,
            cache,
            ..
        } = self;
        let ctx = CalcCtx {
            holders: &*holders,
            register: &*register,
            data: &**data,
            ship: *ship,
            character: *character,
            externals: externals.as_slice(),
        };
        calc::compute(&ctx, cache, holder, attr, &mut Vec::new())
    }

    /// Unmodified value: the item's own attribute, else the attribute
    /// default from the dataset.
    pub fn original_attr(&self, holder: HolderId, attr: AttrId) -> Result<f64, CalcError> {
        let h = self
            .holders
            .get(&holder)
            .ok_or(CalcError::NoSuchHolder(holder))?;
        h.item
            .attrs
            .get(&attr)
            .copied()
            .or_else(|| self.data.attribute(attr).and_then(|m| m.default_value))
            .ok_or(CalcError::AttributeMissing { holder, attr })
    }

    /// Run every restriction; `Ok(())` means the fit is legal.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ctx = RestrictionContext {
            holders: &self.holders,
            ship: self.ship.and_then(|id| self.holders.get(&id)),
        };
        self.restrictions.validate(&ctx)
    }

    /// Drone bandwidth usage, cached until the next mutation.
    pub fn drone_bandwidth(&mut self) -> DroneBandwidth {
        if let Some(cached) = self.stats.drone_bandwidth {
            return cached;
        }
        let online: Vec<HolderId> = self
            .holders
            .values()
            .filter(|h| h.state >= State::Online)
            .map(|h| h.id)
            .collect();
        let mut used = 0.0;
        for id in online {
            if let Ok(value) = self.attr(id, attrs::DRONE_BANDWIDTH_USED) {
                used += value;
            }
        }
        let output = self
            .ship
            .and_then(|ship| self.attr(ship, attrs::DRONE_BANDWIDTH).ok());
        let stat = DroneBandwidth { used, output };
        self.stats.drone_bandwidth = Some(stat);
        stat
    }

    /// Damage one volley from the holder deals, cached until the next
    /// mutation.
    ///
    /// Damage attributes are read from the loaded charge when one is
    /// present; the damage multiplier always comes from the holder
    /// itself and defaults to 1 when absent. A holder below active
    /// state deals nothing: every component is `None`.
    pub fn nominal_volley(&mut self, holder: HolderId) -> Result<Volley, CalcError> {
        if let Some(cached) = self.stats.volleys.get(&holder) {
            return Ok(*cached);
        }
        let (state, source) = match self.holders.get(&holder) {
            Some(h) => (h.state, h.charge.unwrap_or(holder)),
            None => return Err(CalcError::NoSuchHolder(holder)),
        };
        let volley = if state < State::Active {
            Volley::default()
        } else {
            let multiplier = self.attr(holder, attrs::DAMAGE_MULTIPLIER).unwrap_or(1.0);
            Volley {
                em: self
                    .attr(source, attrs::EM_DAMAGE)
                    .ok()
                    .map(|v| v * multiplier),
                thermal: self
                    .attr(source, attrs::THERMAL_DAMAGE)
                    .ok()
                    .map(|v| v * multiplier),
                kinetic: self
                    .attr(source, attrs::KINETIC_DAMAGE)
                    .ok()
                    .map(|v| v * multiplier),
                explosive: self
                    .attr(source, attrs::EXPLOSIVE_DAMAGE)
                    .ok()
                    .map(|v| v * multiplier),
            }
        };
        self.stats.volleys.insert(holder, volley);
        Ok(volley)
    }

    /// Nominal volley reduced by a target's resistances.
    pub fn nominal_volley_against(
        &mut self,
        holder: HolderId,
        target: &ResistanceProfile,
    ) -> Result<Volley, CalcError> {
        Ok(self.nominal_volley(holder)?.against(target))
    }

    /// Number of full attribute computations so far, cache hits excluded.
    pub fn computations(&self) -> u64 {
        self.cache.computations()
    }

    /// Whether every derived structure has been torn back down. Holds
    /// after all holders are removed, whatever happened in between.
    pub fn buffers_empty(&self) -> bool {
        self.register.is_empty()
            && self.cache.is_empty()
            && self.restrictions.tracked_count() == 0
    }

    // ----- fleet plumbing -----

    /// Replace the injected external modifications, invalidating the
    /// targets of both the outgoing and the incoming set.
    pub(crate) fn set_external_affectors(&mut self, new: Vec<ExternalAffector>) {
        if self.externals == new {
            return;
        }
        let mut targets: Vec<CalcNode> = Vec::new();
        for external in self.externals.iter().chain(new.iter()) {
            let resolved = match external.target {
                ExternalTarget::Ship => self.ship,
                ExternalTarget::Character => self.character,
                ExternalTarget::Holder(id) => Some(id),
            };
            if let Some(holder) = resolved {
                targets.push((holder, external.tgt_attr));
            }
        }
        for node in targets {
            self.cache.invalidate(node);
        }
        self.externals = new;
        self.stats.clear();
    }

    /// Gang-scope modifiers currently active on this fit, with their
    /// carrying holders, in holder order.
    pub(crate) fn gang_modifiers(&self) -> Vec<(HolderId, Modifier)> {
        let mut out = Vec::new();
        for holder in self.holders.values() {
            for effect in &holder.item.effects {
                if effect.category.activation_state().is_none() {
                    continue;
                }
                for modifier in &effect.modifiers {
                    if modifier.scope == Scope::Gang && holder.state >= modifier.state {
                        out.push((holder.id, modifier.clone()));
                    }
                }
            }
        }
        out
    }

    /// Active modifiers of one holder that apply through projection,
    /// for cross-fit delivery.
    pub(crate) fn projected_modifiers(&self, source: HolderId) -> Vec<Modifier> {
        let Some(holder) = self.holders.get(&source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for effect in &holder.item.effects {
            if effect.category.activation_state().is_none() {
                continue;
            }
            for modifier in &effect.modifiers {
                let projected = modifier.scope == Scope::Projected
                    || (modifier.scope == Scope::Local
                        && modifier.domain == crate::modifier::Domain::Target);
                if projected && holder.state >= modifier.state {
                    out.push(modifier.clone());
                }
            }
        }
        out
    }

    // ----- internals -----

    fn spawn(&mut self, type_id: TypeId, kind: HolderKind, state: State) -> Result<HolderId, FitError> {
        let item = self
            .data
            .item_type(type_id)
            .cloned()
            .ok_or(FitError::UnknownType(type_id))?;
        let id = HolderId(self.next_id);
        self.next_id += 1;
        self.holders.insert(
            id,
            Holder {
                id,
                kind,
                item,
                state,
                charge: None,
                container: None,
            },
        );
        Ok(id)
    }

    fn enroll(&mut self, id: HolderId) {
        if let Some(holder) = self.holders.get(&id) {
            self.register.register_affector(holder, &self.diag);
            self.restrictions.register_holder(holder);
        }
        self.invalidate_for_affector(id);
    }

    fn discharge(&mut self, id: HolderId) {
        self.invalidate_for_affector(id);
        self.register.unregister_affector(id);
        self.register.drop_projections(id);
        self.restrictions.unregister_holder(id);
        self.cache.purge_holder(id);
        self.stats.clear();
    }

    fn despawn_module(&mut self, id: HolderId) {
        let charge = self.holders.get(&id).and_then(|h| h.charge);
        if let Some(charge) = charge {
            self.discharge(charge);
            self.holders.remove(&charge);
        }
        self.discharge(id);
        self.holders.remove(&id);
    }

    /// Invalidate the cached values of everything the holder's modifiers
    /// currently reach.
    fn invalidate_for_affector(&mut self, id: HolderId) {
        let Some(holder) = self.holders.get(&id) else {
            return;
        };
        let mut targets: Vec<CalcNode> = Vec::new();
        for effect in &holder.item.effects {
            if effect.category.activation_state().is_none() {
                continue;
            }
            for modifier in &effect.modifiers {
                for affectee in self.register.affectees_for(
                    holder,
                    modifier,
                    &self.holders,
                    self.ship,
                    self.character,
                ) {
                    targets.push((affectee, modifier.tgt_attr));
                }
            }
        }
        for node in targets {
            self.cache.invalidate(node);
        }
        self.stats.clear();
    }
}
