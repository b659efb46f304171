//! Effects: named bundles of modifiers attached to item types.

use crate::defs::{EffectId, State};
use crate::modifier::Modifier;
use serde::{Deserialize, Serialize};

/// Effect category, deciding from which activation state onward the
/// effect's modifiers apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    /// Applies while merely fitted.
    Passive,
    /// Applies while running.
    Active,
    /// Targeted application onto another fit's holders.
    Target,
    /// Area of effect. Not runnable by this engine.
    Area,
    /// Applies while powered.
    Online,
    /// Applies while overloaded.
    Overload,
    /// Dungeon environment effect. Not runnable by this engine.
    Dungeon,
    /// System-wide environment effect, always on.
    System,
}

impl EffectCategory {
    /// Minimum holder state from which this category's modifiers apply,
    /// or `None` for categories the engine cannot run.
    pub fn activation_state(self) -> Option<State> {
        match self {
            EffectCategory::Passive | EffectCategory::System => Some(State::Offline),
            EffectCategory::Online => Some(State::Online),
            EffectCategory::Active | EffectCategory::Target => Some(State::Active),
            EffectCategory::Overload => Some(State::Overload),
            EffectCategory::Area | EffectCategory::Dungeon => None,
        }
    }
}

/// Outcome reported by the modifier builder for one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectBuildStatus {
    /// All of the effect's modifiers were reconstructed.
    OkFull,
    /// Some modifiers were reconstructed, others dropped.
    OkPartial,
    /// The effect could not be reconstructed at all.
    Error,
}

/// One effect: category plus the modifiers it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect id.
    pub id: EffectId,
    /// Category deciding the activation state.
    pub category: EffectCategory,
    /// Modifiers applied when the carrying holder reaches the
    /// activation state.
    pub modifiers: Vec<Modifier>,
    /// How completely the builder reconstructed this effect.
    pub build_status: EffectBuildStatus,
}

impl Effect {
    /// Create an effect with no modifiers, fully built.
    pub fn new(id: EffectId, category: EffectCategory) -> Self {
        Self {
            id,
            category,
            modifiers: Vec::new(),
            build_status: EffectBuildStatus::OkFull,
        }
    }

    /// Append a modifier.
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Set the build status.
    pub fn build_status(mut self, status: EffectBuildStatus) -> Self {
        self.build_status = status;
        self
    }
}
