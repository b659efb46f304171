//! Modifier value type.
//!
//! A modifier is one effect-driven rule by which an attribute of some
//! target set changes: required activation state, scope, domain, optional
//! filter, arithmetic operator, source (attribute or literal) and target
//! attribute. Modifiers are produced by an external builder and consumed
//! by the engine as immutable data.

use crate::defs::{AttrId, GroupId, State, TypeId};
use serde::{Deserialize, Serialize};

/// Which fits' holders are eligible targets relative to the carrying fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Holders of the fit carrying the source holder.
    Local,
    /// Domain roots of every fit in the same fleet.
    Gang,
    /// Holders the source has been explicitly projected onto.
    Projected,
}

/// Which holder role within the scope qualifies as candidate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// The source holder itself.
    Itself,
    /// The ship holder.
    Ship,
    /// The character holder.
    Character,
    /// The module/charge counterpart of the source holder.
    Other,
    /// Holders designated as projection targets of the source.
    Target,
}

/// Further narrows candidate targets within the domain.
///
/// An unrecognized filter type delivered by the builder is preserved as
/// [`ModFilter::Unknown`] so the registry can reject it with a diagnostic
/// without aborting the effect's sibling modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModFilter {
    /// The domain holder itself, no filtering.
    Direct,
    /// All holders located in the domain.
    All,
    /// Holders whose item group matches.
    Group(GroupId),
    /// Holders requiring the given skill.
    Skill(TypeId),
    /// Unrecognized filter type, carried verbatim from the builder.
    Unknown(i32),
}

/// Arithmetic applied by a modifier, in pipeline order.
///
/// The declaration order is the evaluation order: assignments first,
/// pre-multiplications, flat additions, post-multiplications, final
/// assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Operator {
    /// Replace the base value before any other arithmetic.
    PreAssign,
    /// Multiply before the additive step.
    PreMul,
    /// Divide before the additive step.
    PreDiv,
    /// Flat addition.
    ModAdd,
    /// Flat subtraction.
    ModSub,
    /// Multiply after the additive step.
    PostMul,
    /// Divide after the additive step.
    PostDiv,
    /// Percentage change after the additive step: `value * (1 + pct / 100)`.
    PostPercent,
    /// Replace the value after all other arithmetic.
    PostAssign,
}

/// Source of a modifier's operand: an attribute on the carrying holder,
/// or a literal number. Exactly one of the two, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModSrc {
    /// Read the operand from this attribute of the source holder.
    Attr(AttrId),
    /// Use this literal operand.
    Literal(f64),
}

/// One immutable modification rule.
///
/// # Examples
///
/// ```rust
/// use fitstat::{Domain, ModFilter, ModSrc, Modifier, Operator, Scope, State};
///
/// // "+x% to an attribute of the ship, while merely fitted"
/// let modifier = Modifier {
///     state: State::Offline,
///     scope: Scope::Local,
///     domain: Domain::Ship,
///     filter: ModFilter::Direct,
///     operator: Operator::PostPercent,
///     src: ModSrc::Attr(2),
///     tgt_attr: 1,
/// };
/// assert_eq!(modifier.tgt_attr, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Minimum activation state of the carrying holder for this modifier
    /// to apply.
    pub state: State,
    /// Eligible-fit scope.
    pub scope: Scope,
    /// Candidate holder role within the scope.
    pub domain: Domain,
    /// Candidate narrowing within the domain.
    pub filter: ModFilter,
    /// Arithmetic and pipeline position.
    pub operator: Operator,
    /// Operand source.
    pub src: ModSrc,
    /// Attribute being modified.
    pub tgt_attr: AttrId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_pipeline_order() {
        assert!(Operator::PreAssign < Operator::PreMul);
        assert!(Operator::PreDiv < Operator::ModAdd);
        assert!(Operator::ModSub < Operator::PostMul);
        assert!(Operator::PostPercent < Operator::PostAssign);
    }

    #[test]
    fn test_unknown_filter_round_trips() {
        let filter = ModFilter::Unknown(26500);
        let json = serde_json::to_string(&filter).unwrap();
        let back: ModFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(filter, back);
    }
}
