//! Item types: immutable reference-data entries holders are instantiated
//! from.

use crate::defs::{AttrId, EffectId, GroupId, TypeId};
use crate::effect::Effect;
use std::collections::HashMap;
use std::sync::Arc;

/// One immutable item type.
///
/// Carries base attribute values, the effects the type grants, and the
/// skills it requires. Shared between holders via `Arc`.
///
/// # Examples
///
/// ```rust
/// use fitstat::ItemType;
///
/// let hull = ItemType::new(100, 4).attr(9, 500.0).attr(263, 2500.0);
/// assert_eq!(hull.attrs.get(&9), Some(&500.0));
/// ```
#[derive(Debug, Clone)]
pub struct ItemType {
    /// Type id.
    pub id: TypeId,
    /// Group the type belongs to.
    pub group_id: GroupId,
    /// Base attribute values.
    pub attrs: HashMap<AttrId, f64>,
    /// Effects granted by this type.
    pub effects: Vec<Arc<Effect>>,
    /// The type's default effect, if it has one.
    pub default_effect: Option<EffectId>,
    /// Skills required to use the type.
    pub required_skills: Vec<TypeId>,
}

impl ItemType {
    /// Create a type with no attributes, effects or skill requirements.
    pub fn new(id: TypeId, group_id: GroupId) -> Self {
        Self {
            id,
            group_id,
            attrs: HashMap::new(),
            effects: Vec::new(),
            default_effect: None,
            required_skills: Vec::new(),
        }
    }

    /// Set a base attribute value.
    pub fn attr(mut self, attr: AttrId, value: f64) -> Self {
        self.attrs.insert(attr, value);
        self
    }

    /// Attach an effect.
    pub fn effect(mut self, effect: Arc<Effect>) -> Self {
        self.effects.push(effect);
        self
    }

    /// Mark one of the attached effects as the default.
    pub fn default_effect(mut self, effect: EffectId) -> Self {
        self.default_effect = Some(effect);
        self
    }

    /// Add a skill requirement.
    pub fn requires_skill(mut self, skill: TypeId) -> Self {
        self.required_skills.push(skill);
        self
    }
}
