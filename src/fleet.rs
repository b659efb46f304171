//! Fleets: gang boosts and cross-fit projection.
//!
//! Fits never hold references to each other. The fleet owns its member
//! fits outright and, lazily before any read, resolves boost source
//! values on the fits carrying them and injects the results into every
//! member as literal external modifications. A boost whose own source
//! value depends on another boost settles on the refresh after the one
//! that delivered it.

use crate::calc::{ExternalAffector, ExternalTarget};
use crate::defs::AttrId;
use crate::error::CalcError;
use crate::fit::Fit;
use crate::holder::{HolderId, HolderKind};
use crate::modifier::{Domain, ModSrc, Modifier};
use std::collections::BTreeMap;
use thiserror::Error;

/// Handle to a fit within its fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FitKey(pub u32);

/// Fleet-level failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// The fit handle refers to nothing in this fleet.
    #[error("no such fit {0:?}")]
    NoSuchFit(FitKey),
    /// The holder handle refers to nothing on the named fit.
    #[error("no such holder {0} on fit {1:?}")]
    NoSuchHolder(HolderId, FitKey),
    /// A calculation on a member fit failed.
    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// A standing projection of one fit's holder onto another fit's holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FleetProjection {
    source_fit: FitKey,
    source: HolderId,
    target_fit: FitKey,
    target: HolderId,
}

/// A fleet of fits.
///
/// Reads go through the fleet so boost injection can refresh first:
/// [`Fleet::attr`] on a member is [`Fit::attr`] plus up-to-date boosts.
#[derive(Debug, Default)]
pub struct Fleet {
    fits: BTreeMap<FitKey, Fit>,
    next: u32,
    projections: Vec<FleetProjection>,
    dirty: bool,
}

impl Fleet {
    /// Create an empty fleet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a fit into the fleet.
    pub fn add_fit(&mut self, fit: Fit) -> FitKey {
        let key = FitKey(self.next);
        self.next += 1;
        self.fits.insert(key, fit);
        self.dirty = true;
        key
    }

    /// Release a fit from the fleet, dropping its boosts and every
    /// projection it takes part in.
    pub fn remove_fit(&mut self, key: FitKey) -> Option<Fit> {
        let mut fit = self.fits.remove(&key)?;
        self.projections
            .retain(|p| p.source_fit != key && p.target_fit != key);
        fit.set_external_affectors(Vec::new());
        self.dirty = true;
        Some(fit)
    }

    /// Number of member fits.
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Whether the fleet has no members.
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Read access to a member fit. Boosts may be stale; use
    /// [`Fleet::attr`] for calculated values.
    pub fn fit(&self, key: FitKey) -> Option<&Fit> {
        self.fits.get(&key)
    }

    /// Mutate a member fit. Marks boosts stale.
    pub fn fit_mut(&mut self, key: FitKey) -> Option<&mut Fit> {
        self.dirty = true;
        self.fits.get_mut(&key)
    }

    /// Project a holder of one fit onto a holder of another fit.
    pub fn project(
        &mut self,
        source_fit: FitKey,
        source: HolderId,
        target_fit: FitKey,
        target: HolderId,
    ) -> Result<(), FleetError> {
        self.check_holder(source_fit, source)?;
        self.check_holder(target_fit, target)?;
        self.projections.push(FleetProjection {
            source_fit,
            source,
            target_fit,
            target,
        });
        self.dirty = true;
        Ok(())
    }

    /// Withdraw a cross-fit projection.
    pub fn unproject(
        &mut self,
        source_fit: FitKey,
        source: HolderId,
        target_fit: FitKey,
        target: HolderId,
    ) -> Result<(), FleetError> {
        let wanted = FleetProjection {
            source_fit,
            source,
            target_fit,
            target,
        };
        let pos = self
            .projections
            .iter()
            .position(|p| *p == wanted)
            .ok_or(FleetError::NoSuchHolder(source, source_fit))?;
        self.projections.remove(pos);
        self.dirty = true;
        Ok(())
    }

    /// Modified attribute value on a member fit, boosts included.
    pub fn attr(
        &mut self,
        fit: FitKey,
        holder: HolderId,
        attr: AttrId,
    ) -> Result<f64, FleetError> {
        self.refresh();
        self.fits
            .get_mut(&fit)
            .ok_or(FleetError::NoSuchFit(fit))?
            .attr(holder, attr)
            .map_err(FleetError::from)
    }

    fn check_holder(&self, fit: FitKey, holder: HolderId) -> Result<(), FleetError> {
        let f = self.fits.get(&fit).ok_or(FleetError::NoSuchFit(fit))?;
        if f.holder(holder).is_none() {
            return Err(FleetError::NoSuchHolder(holder, fit));
        }
        Ok(())
    }

    /// One injection pass: resolve every boost and projection source
    /// value against current member state, then hand each fit its new
    /// external set.
    fn refresh(&mut self) {
        if !self.dirty {
            return;
        }

        // Gang boosts, gathered in member order.
        let mut gang: Vec<(FitKey, HolderId, Modifier)> = Vec::new();
        for (key, fit) in &self.fits {
            for (holder, modifier) in fit.gang_modifiers() {
                gang.push((*key, holder, modifier));
            }
        }
        let mut boosts: Vec<ExternalAffector> = Vec::new();
        for (key, holder, modifier) in gang {
            let Some(target) = gang_target(modifier.domain) else {
                continue;
            };
            let Some(value) = self.resolve_operand(key, holder, &modifier) else {
                continue;
            };
            boosts.push(ExternalAffector {
                target,
                operator: modifier.operator,
                value,
                tgt_attr: modifier.tgt_attr,
            });
        }

        // Cross-fit projections become holder-addressed externals.
        let projections = self.projections.clone();
        let mut per_fit: BTreeMap<FitKey, Vec<ExternalAffector>> = BTreeMap::new();
        for projection in projections {
            let target_kind = match self
                .fits
                .get(&projection.target_fit)
                .and_then(|f| f.holder(projection.target))
            {
                Some(holder) => holder.kind,
                None => continue,
            };
            let modifiers = match self.fits.get(&projection.source_fit) {
                Some(fit) => fit.projected_modifiers(projection.source),
                None => continue,
            };
            for modifier in modifiers {
                if !projected_kind_matches(target_kind, modifier.domain) {
                    continue;
                }
                let Some(value) =
                    self.resolve_operand(projection.source_fit, projection.source, &modifier)
                else {
                    continue;
                };
                per_fit
                    .entry(projection.target_fit)
                    .or_default()
                    .push(ExternalAffector {
                        target: ExternalTarget::Holder(projection.target),
                        operator: modifier.operator,
                        value,
                        tgt_attr: modifier.tgt_attr,
                    });
            }
        }

        let keys: Vec<FitKey> = self.fits.keys().copied().collect();
        for key in keys {
            let mut externals = boosts.clone();
            externals.extend(per_fit.remove(&key).unwrap_or_default());
            if let Some(fit) = self.fits.get_mut(&key) {
                fit.set_external_affectors(externals);
            }
        }
        self.dirty = false;
    }

    /// Boost operand against the carrying fit's current values. `None`
    /// when the source attribute cannot be resolved; the boost is then
    /// simply not delivered this refresh.
    fn resolve_operand(
        &mut self,
        fit: FitKey,
        holder: HolderId,
        modifier: &Modifier,
    ) -> Option<f64> {
        match modifier.src {
            ModSrc::Literal(value) => Some(value),
            ModSrc::Attr(attr) => self
                .fits
                .get_mut(&fit)
                .and_then(|f| f.attr(holder, attr).ok()),
        }
    }
}

fn gang_target(domain: Domain) -> Option<ExternalTarget> {
    match domain {
        Domain::Ship => Some(ExternalTarget::Ship),
        Domain::Character => Some(ExternalTarget::Character),
        _ => None,
    }
}

fn projected_kind_matches(target: HolderKind, domain: Domain) -> bool {
    match domain {
        Domain::Target => true,
        Domain::Ship => target == HolderKind::Ship,
        Domain::Character => target == HolderKind::Character,
        _ => false,
    }
}
