//! Attribute computation: the operator pipeline, stacking penalty,
//! memoization and dependency-driven invalidation.

use crate::data::SourceData;
use crate::defs::AttrId;
use crate::error::CalcError;
use crate::holder::{Holder, HolderId, HolderKind};
use crate::modifier::{ModSrc, Operator};
use crate::registry::AffectionRegister;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One computed value: a holder/attribute pair.
pub(crate) type CalcNode = (HolderId, AttrId);

/// `exp(-(i / 2.67)^2)`, with the denominator squared once.
const PENALTY_DENOM: f64 = 7.1289;

/// Where an externally injected modification lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTarget {
    /// The fit's ship holder.
    Ship,
    /// The fit's character holder.
    Character,
    /// A specific holder.
    Holder(HolderId),
}

/// A literal modification injected from outside the fit, e.g. a fleet
/// boost or a cross-fit projection. Exempt from stacking penalties.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAffector {
    /// Which holder the modification lands on.
    pub target: ExternalTarget,
    /// Arithmetic and pipeline position.
    pub operator: Operator,
    /// Literal operand, already resolved by the injector.
    pub value: f64,
    /// Attribute being modified.
    pub tgt_attr: AttrId,
}

impl ExternalAffector {
    fn applies_to(&self, holder: HolderId, ship: Option<HolderId>, character: Option<HolderId>) -> bool {
        match self.target {
            ExternalTarget::Ship => Some(holder) == ship,
            ExternalTarget::Character => Some(holder) == character,
            ExternalTarget::Holder(id) => holder == id,
        }
    }
}

/// Memoized values plus the reverse dependency graph.
///
/// An edge `a -> b` means the value at `b` was computed from the value
/// at `a`; invalidating `a` therefore invalidates everything reachable
/// from it.
#[derive(Debug, Default)]
pub(crate) struct AttrCache {
    values: HashMap<CalcNode, f64>,
    deps: DiGraphMap<CalcNode, ()>,
    computations: u64,
}

impl AttrCache {
    pub fn get(&self, node: CalcNode) -> Option<f64> {
        self.values.get(&node).copied()
    }

    pub fn add_dep(&mut self, src: CalcNode, dst: CalcNode) {
        self.deps.add_edge(src, dst, ());
    }

    /// Number of full computations performed, cache hits excluded.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drop the node's value and every value computed from it. The walk
    /// keeps a visited set, so dependency cycles terminate.
    pub fn invalidate(&mut self, node: CalcNode) {
        let mut stack = vec![node];
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            self.values.remove(&current);
            stack.extend(self.deps.neighbors_directed(current, Direction::Outgoing));
        }
        for n in visited {
            self.deps.remove_node(n);
        }
    }

    /// Drop every value of one holder, with downstream invalidation.
    pub fn purge_holder(&mut self, holder: HolderId) {
        let mut nodes: Vec<CalcNode> = self
            .values
            .keys()
            .copied()
            .filter(|(h, _)| *h == holder)
            .collect();
        nodes.extend(self.deps.nodes().filter(|(h, _)| *h == holder));
        for node in nodes {
            self.invalidate(node);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.deps.node_count() == 0
    }
}

/// Borrowed view of everything a computation needs.
pub(crate) struct CalcCtx<'a> {
    pub holders: &'a BTreeMap<HolderId, Holder>,
    pub register: &'a AffectionRegister,
    pub data: &'a SourceData,
    pub ship: Option<HolderId>,
    pub character: Option<HolderId>,
    pub externals: &'a [ExternalAffector],
}

/// One multiplicative contribution.
struct MulEntry {
    multiplier: f64,
    penalizable: bool,
}

/// Compute the modified value of one attribute on one holder.
///
/// `seen` is the in-progress node stack; re-entering a node means the
/// attribute participates in a dependency cycle, and the inner read
/// falls back to the unmodified base value.
pub(crate) fn compute(
    ctx: &CalcCtx<'_>,
    cache: &mut AttrCache,
    holder_id: HolderId,
    attr: AttrId,
    seen: &mut Vec<CalcNode>,
) -> Result<f64, CalcError> {
    let node = (holder_id, attr);
    if let Some(value) = cache.get(node) {
        return Ok(value);
    }
    let holder = ctx
        .holders
        .get(&holder_id)
        .ok_or(CalcError::NoSuchHolder(holder_id))?;
    if seen.contains(&node) {
        return base_value(ctx, holder, attr).ok_or(CalcError::AttributeMissing {
            holder: holder_id,
            attr,
        });
    }
    seen.push(node);
    let result = compute_inner(ctx, cache, holder, attr, seen);
    seen.pop();
    if let Ok(value) = result {
        cache.values.insert(node, value);
        cache.deps.add_node(node);
        cache.computations += 1;
    }
    result
}

fn compute_inner(
    ctx: &CalcCtx<'_>,
    cache: &mut AttrCache,
    holder: &Holder,
    attr: AttrId,
    seen: &mut Vec<CalcNode>,
) -> Result<f64, CalcError> {
    let node = (holder.id, attr);
    let meta = ctx.data.attribute(attr);
    let high_is_good = meta.map_or(true, |m| m.high_is_good);
    let stackable = meta.map_or(true, |m| m.stackable);

    let mut pre_assigns: Vec<f64> = Vec::new();
    let mut post_assigns: Vec<f64> = Vec::new();
    let mut addition = 0.0;
    let mut chains: HashMap<Operator, Vec<MulEntry>> = HashMap::new();

    let affectors = ctx
        .register
        .affectors_for(holder, ctx.holders, ctx.ship, ctx.character);
    for affector in affectors {
        let modifier = &affector.modifier;
        if modifier.tgt_attr != attr {
            continue;
        }
        let (source_state, source_kind) = match ctx.holders.get(&affector.holder) {
            Some(source) => (source.state, source.kind),
            None => continue,
        };
        if source_state < modifier.state {
            continue;
        }
        let operand = match modifier.src {
            ModSrc::Literal(value) => value,
            ModSrc::Attr(src_attr) => {
                match compute(ctx, cache, affector.holder, src_attr, seen) {
                    Ok(value) => {
                        cache.add_dep((affector.holder, src_attr), node);
                        value
                    }
                    // A source without a value contributes nothing.
                    Err(CalcError::AttributeMissing { .. }) => continue,
                    Err(CalcError::NoSuchHolder(_)) => continue,
                }
            }
        };
        apply_operand(
            modifier.operator,
            operand,
            !stackable && !penalty_immune(source_kind),
            &mut pre_assigns,
            &mut post_assigns,
            &mut addition,
            &mut chains,
        );
    }

    for external in ctx.externals {
        if external.tgt_attr != attr
            || !external.applies_to(holder.id, ctx.ship, ctx.character)
        {
            continue;
        }
        // Injected boosts never take stacking penalties.
        apply_operand(
            external.operator,
            external.value,
            false,
            &mut pre_assigns,
            &mut post_assigns,
            &mut addition,
            &mut chains,
        );
    }

    let base = if pre_assigns.is_empty() {
        match base_value(ctx, holder, attr) {
            Some(value) => value,
            None if !post_assigns.is_empty() => 0.0,
            None => {
                return Err(CalcError::AttributeMissing {
                    holder: holder.id,
                    attr,
                })
            }
        }
    } else {
        pick_assigned(&pre_assigns, high_is_good)
    };

    let mut value = base;
    for op in [Operator::PreMul, Operator::PreDiv] {
        if let Some(chain) = chains.get(&op) {
            value *= chain_product(chain);
        }
    }
    value += addition;
    for op in [Operator::PostMul, Operator::PostDiv, Operator::PostPercent] {
        if let Some(chain) = chains.get(&op) {
            value *= chain_product(chain);
        }
    }
    if !post_assigns.is_empty() {
        value = pick_assigned(&post_assigns, high_is_good);
    }
    Ok(value)
}

#[allow(clippy::too_many_arguments)]
fn apply_operand(
    operator: Operator,
    operand: f64,
    penalizable: bool,
    pre_assigns: &mut Vec<f64>,
    post_assigns: &mut Vec<f64>,
    addition: &mut f64,
    chains: &mut HashMap<Operator, Vec<MulEntry>>,
) {
    match operator {
        Operator::PreAssign => pre_assigns.push(operand),
        Operator::PostAssign => post_assigns.push(operand),
        Operator::ModAdd => *addition += operand,
        Operator::ModSub => *addition -= operand,
        Operator::PreMul | Operator::PostMul => {
            chains.entry(operator).or_default().push(MulEntry {
                multiplier: operand,
                penalizable,
            });
        }
        Operator::PreDiv | Operator::PostDiv => {
            chains.entry(operator).or_default().push(MulEntry {
                multiplier: 1.0 / operand,
                penalizable,
            });
        }
        Operator::PostPercent => {
            chains.entry(operator).or_default().push(MulEntry {
                multiplier: 1.0 + operand / 100.0,
                penalizable,
            });
        }
    }
}

/// Source kinds whose modifications never take stacking penalties.
/// Hull bonuses, charges, skills and implants apply at full strength no
/// matter how many stack on one attribute.
fn penalty_immune(kind: HolderKind) -> bool {
    matches!(
        kind,
        HolderKind::Ship | HolderKind::Charge | HolderKind::Skill | HolderKind::Implant
    )
}

/// Unmodified base: the item's own value, else the attribute default.
fn base_value(ctx: &CalcCtx<'_>, holder: &Holder, attr: AttrId) -> Option<f64> {
    holder
        .item
        .attrs
        .get(&attr)
        .copied()
        .or_else(|| ctx.data.attribute(attr).and_then(|m| m.default_value))
}

/// Competing assignments resolve to the extremum favored by the
/// attribute: the largest candidate when high is good, else the smallest.
fn pick_assigned(candidates: &[f64], high_is_good: bool) -> f64 {
    let folded = if high_is_good {
        candidates.iter().copied().reduce(f64::max)
    } else {
        candidates.iter().copied().reduce(f64::min)
    };
    // Callers only reach this with a non-empty candidate list.
    folded.unwrap_or(f64::NAN)
}

/// Product of one operator class's multipliers, penalized where due.
fn chain_product(chain: &[MulEntry]) -> f64 {
    let mut product = 1.0;
    let mut penalized: Vec<f64> = Vec::new();
    for entry in chain {
        if entry.penalizable && entry.multiplier != 1.0 {
            penalized.push(entry.multiplier);
        } else {
            product *= entry.multiplier;
        }
    }
    product * penalized_product(&mut penalized)
}

/// Stacking penalty: bonuses and maluses form separate chains, each
/// sorted hardest-first, and the i-th entry is scaled by
/// `exp(-i^2 / 7.1289)`. Sorting is stable, so equal magnitudes keep
/// their registration order.
fn penalized_product(multipliers: &mut [f64]) -> f64 {
    multipliers.sort_by(|a, b| (b - 1.0).abs().total_cmp(&(a - 1.0).abs()));
    let mut product = 1.0;
    let mut bonuses = 0;
    let mut maluses = 0;
    for &m in multipliers.iter() {
        let position = if m > 1.0 {
            let p = bonuses;
            bonuses += 1;
            p
        } else {
            let p = maluses;
            maluses += 1;
            p
        };
        let coeff = (-((position * position) as f64) / PENALTY_DENOM).exp();
        product *= 1.0 + (m - 1.0) * coeff;
    }
    product
}
