//! Affection register: which holders' modifiers reach which targets.
//!
//! Affectors are bucketed by how their target set is described (the
//! holder itself, a domain root, the module/charge counterpart, a
//! filtered location, a projection target); the concrete target holders
//! are resolved at query time against the fit's current roots. A ship or
//! character swap therefore needs no re-registration.

use crate::diag::DiagnosticsSink;
use crate::holder::{Holder, HolderId, HolderKind};
use crate::modifier::{Domain, ModFilter, Modifier, Scope};
use std::collections::{BTreeMap, HashMap};

/// One registered modifier together with the holder carrying it.
#[derive(Debug, Clone)]
pub(crate) struct Affector {
    pub holder: HolderId,
    pub modifier: Modifier,
}

/// Affector buckets plus the projection table.
#[derive(Debug, Default)]
pub(crate) struct AffectionRegister {
    /// Domain `Itself`, keyed by the carrying holder.
    self_affectors: HashMap<HolderId, Vec<Affector>>,
    /// Direct modifications of the ship or character root.
    root_affectors: HashMap<Domain, Vec<Affector>>,
    /// Domain `Other`, keyed by the carrying holder.
    other_affectors: HashMap<HolderId, Vec<Affector>>,
    /// Filtered modifications over a located domain.
    located_affectors: HashMap<Domain, Vec<Affector>>,
    /// Modifications of projection targets, keyed by the carrying holder.
    target_affectors: HashMap<HolderId, Vec<Affector>>,
    /// Source holder to its projection targets.
    projections: HashMap<HolderId, Vec<HolderId>>,
    /// Target holder to the sources projected onto it.
    rev_projections: HashMap<HolderId, Vec<HolderId>>,
}

impl AffectionRegister {
    /// Register every runnable modifier the holder's item carries.
    ///
    /// Malformed modifiers are skipped with a warning; their siblings
    /// register normally. Gang-scope modifiers are not local concerns
    /// and are skipped silently (the fleet layer picks them up).
    pub fn register_affector(&mut self, holder: &Holder, diag: &DiagnosticsSink) {
        for effect in &holder.item.effects {
            if effect.category.activation_state().is_none() {
                continue;
            }
            for modifier in &effect.modifiers {
                self.register_modifier(holder, modifier, diag);
            }
        }
    }

    fn register_modifier(&mut self, holder: &Holder, modifier: &Modifier, diag: &DiagnosticsSink) {
        if let ModFilter::Unknown(raw) = modifier.filter {
            diag.warn(
                "registry",
                format!(
                    "malformed modifier on item {}: invalid filter type {}",
                    holder.item.id, raw
                ),
            );
            return;
        }
        let affector = Affector {
            holder: holder.id,
            modifier: modifier.clone(),
        };
        match modifier.scope {
            Scope::Gang => {}
            Scope::Projected => {
                self.target_affectors
                    .entry(holder.id)
                    .or_default()
                    .push(affector);
            }
            Scope::Local => match (modifier.domain, modifier.filter) {
                (Domain::Target, _) => {
                    self.target_affectors
                        .entry(holder.id)
                        .or_default()
                        .push(affector);
                }
                (Domain::Itself, ModFilter::Direct) => {
                    self.self_affectors
                        .entry(holder.id)
                        .or_default()
                        .push(affector);
                }
                (Domain::Other, ModFilter::Direct) => {
                    self.other_affectors
                        .entry(holder.id)
                        .or_default()
                        .push(affector);
                }
                (domain @ (Domain::Ship | Domain::Character), ModFilter::Direct) => {
                    self.root_affectors.entry(domain).or_default().push(affector);
                }
                (domain @ (Domain::Ship | Domain::Character), _) => {
                    self.located_affectors
                        .entry(domain)
                        .or_default()
                        .push(affector);
                }
                (Domain::Itself | Domain::Other, _) => {
                    diag.warn(
                        "registry",
                        format!(
                            "malformed modifier on item {}: filtered modification on unsupported domain",
                            holder.item.id
                        ),
                    );
                }
            },
        }
    }

    /// Drop every affector carried by the holder.
    pub fn unregister_affector(&mut self, id: HolderId) {
        self.self_affectors.remove(&id);
        self.other_affectors.remove(&id);
        self.target_affectors.remove(&id);
        for bucket in self.root_affectors.values_mut() {
            bucket.retain(|a| a.holder != id);
        }
        for bucket in self.located_affectors.values_mut() {
            bucket.retain(|a| a.holder != id);
        }
        self.root_affectors.retain(|_, b| !b.is_empty());
        self.located_affectors.retain(|_, b| !b.is_empty());
    }

    /// Record a projection of `source` onto `target`.
    pub fn add_projection(&mut self, source: HolderId, target: HolderId) {
        self.projections.entry(source).or_default().push(target);
        self.rev_projections.entry(target).or_default().push(source);
    }

    /// Withdraw one projection.
    pub fn remove_projection(&mut self, source: HolderId, target: HolderId) {
        if let Some(targets) = self.projections.get_mut(&source) {
            if let Some(pos) = targets.iter().position(|t| *t == target) {
                targets.remove(pos);
            }
            if targets.is_empty() {
                self.projections.remove(&source);
            }
        }
        if let Some(sources) = self.rev_projections.get_mut(&target) {
            if let Some(pos) = sources.iter().position(|s| *s == source) {
                sources.remove(pos);
            }
            if sources.is_empty() {
                self.rev_projections.remove(&target);
            }
        }
    }

    /// Withdraw every projection the holder takes part in, either side.
    pub fn drop_projections(&mut self, id: HolderId) {
        if let Some(targets) = self.projections.remove(&id) {
            for target in targets {
                if let Some(sources) = self.rev_projections.get_mut(&target) {
                    sources.retain(|s| *s != id);
                    if sources.is_empty() {
                        self.rev_projections.remove(&target);
                    }
                }
            }
        }
        if let Some(sources) = self.rev_projections.remove(&id) {
            for source in sources {
                if let Some(targets) = self.projections.get_mut(&source) {
                    targets.retain(|t| *t != id);
                    if targets.is_empty() {
                        self.projections.remove(&source);
                    }
                }
            }
        }
    }

    /// Targets the holder is currently projected onto.
    pub fn projection_targets(&self, source: HolderId) -> &[HolderId] {
        self.projections.get(&source).map_or(&[], Vec::as_slice)
    }

    /// Every affector whose modifier reaches `holder` right now.
    pub fn affectors_for(
        &self,
        holder: &Holder,
        holders: &BTreeMap<HolderId, Holder>,
        ship: Option<HolderId>,
        character: Option<HolderId>,
    ) -> Vec<Affector> {
        let mut out = Vec::new();
        if let Some(bucket) = self.self_affectors.get(&holder.id) {
            out.extend(bucket.iter().cloned());
        }
        if Some(holder.id) == ship {
            if let Some(bucket) = self.root_affectors.get(&Domain::Ship) {
                out.extend(bucket.iter().cloned());
            }
        }
        if Some(holder.id) == character {
            if let Some(bucket) = self.root_affectors.get(&Domain::Character) {
                out.extend(bucket.iter().cloned());
            }
        }
        if let Some(counterpart) = holder.other() {
            if let Some(bucket) = self.other_affectors.get(&counterpart) {
                for affector in bucket {
                    let linked = holders
                        .get(&affector.holder)
                        .and_then(Holder::other);
                    if linked == Some(holder.id) {
                        out.push(affector.clone());
                    }
                }
            }
        }
        for (domain, bucket) in &self.located_affectors {
            if !Self::located_in(holder, *domain) {
                continue;
            }
            for affector in bucket {
                if Self::filter_matches(holder, affector.modifier.filter) {
                    out.push(affector.clone());
                }
            }
        }
        if let Some(sources) = self.rev_projections.get(&holder.id) {
            for source in sources {
                if let Some(bucket) = self.target_affectors.get(source) {
                    for affector in bucket {
                        if Self::projected_domain_matches(holder, affector.modifier.domain) {
                            out.push(affector.clone());
                        }
                    }
                }
            }
        }
        out
    }

    /// Holders a modifier of `source` reaches right now. The mirror of
    /// [`Self::affectors_for`], used to invalidate cached values.
    pub fn affectees_for(
        &self,
        source: &Holder,
        modifier: &Modifier,
        holders: &BTreeMap<HolderId, Holder>,
        ship: Option<HolderId>,
        character: Option<HolderId>,
    ) -> Vec<HolderId> {
        match modifier.scope {
            // Gang boosts reach local holders only via injected external
            // affectors, which the fit invalidates separately.
            Scope::Gang => Vec::new(),
            Scope::Projected => self.projected_affectees(source, modifier, holders),
            Scope::Local => match (modifier.domain, modifier.filter) {
                (Domain::Target, _) => self.projected_affectees(source, modifier, holders),
                (Domain::Itself, _) => vec![source.id],
                (Domain::Other, _) => source.other().into_iter().collect(),
                (Domain::Ship, ModFilter::Direct) => ship.into_iter().collect(),
                (Domain::Character, ModFilter::Direct) => character.into_iter().collect(),
                (domain @ (Domain::Ship | Domain::Character), _) => holders
                    .values()
                    .filter(|h| {
                        Self::located_in(h, domain) && Self::filter_matches(h, modifier.filter)
                    })
                    .map(|h| h.id)
                    .collect(),
            },
        }
    }

    fn projected_affectees(
        &self,
        source: &Holder,
        modifier: &Modifier,
        holders: &BTreeMap<HolderId, Holder>,
    ) -> Vec<HolderId> {
        self.projection_targets(source.id)
            .iter()
            .filter(|t| {
                holders
                    .get(*t)
                    .is_some_and(|h| Self::projected_domain_matches(h, modifier.domain))
            })
            .copied()
            .collect()
    }

    fn located_in(holder: &Holder, domain: Domain) -> bool {
        match domain {
            Domain::Ship => {
                holder.kind.location() == crate::defs::Location::Ship
                    && holder.kind != HolderKind::Ship
            }
            Domain::Character => {
                holder.kind.location() == crate::defs::Location::Character
                    && holder.kind != HolderKind::Character
            }
            _ => false,
        }
    }

    fn filter_matches(holder: &Holder, filter: ModFilter) -> bool {
        match filter {
            ModFilter::Direct | ModFilter::All => true,
            ModFilter::Group(group) => holder.item.group_id == group,
            ModFilter::Skill(skill) => holder.item.required_skills.contains(&skill),
            ModFilter::Unknown(_) => false,
        }
    }

    fn projected_domain_matches(target: &Holder, domain: Domain) -> bool {
        match domain {
            Domain::Target => true,
            Domain::Ship => target.kind == HolderKind::Ship,
            Domain::Character => target.kind == HolderKind::Character,
            _ => false,
        }
    }

    /// Whether every bucket and the projection table are empty.
    pub fn is_empty(&self) -> bool {
        self.self_affectors.is_empty()
            && self.root_affectors.is_empty()
            && self.other_affectors.is_empty()
            && self.located_affectors.is_empty()
            && self.target_affectors.is_empty()
            && self.projections.is_empty()
            && self.rev_projections.is_empty()
    }
}
