//! # fitstat - Deterministic Ship-Fitting Attribute Engine
//!
//! A what-if attribute calculation engine for ship fitting simulation:
//! - **Deterministic** results (same fit → bit-identical values)
//! - **Data-driven** design (attributes, effects and modifiers come from
//!   a dataset, never from code)
//! - **Pull-based** calculation (nothing is computed until asked)
//! - **Precisely invalidated** (a change recomputes only what it touched)
//!
//! ## Core Concepts
//!
//! ### Calculation Pipeline
//!
//! A modified attribute value flows through a fixed operator pipeline:
//!
//! ```text
//! [base] → pre-assign → pre-mul/div → add/sub → post-mul/div/percent → post-assign
//! ```
//!
//! Multiplicative modifiers of a non-stackable attribute take a stacking
//! penalty: within each operator class, bonuses and maluses form separate
//! chains sorted hardest-first, and the i-th entry only contributes
//! `1 + (m - 1) * exp(-i^2 / 7.1289)`.
//!
//! ### Fits and Holders
//!
//! A [`Fit`] owns its holders (ship, character, modules, drones, charges,
//! implants, skills) and every derived structure. Mutations go through
//! the fit; reads are pull-based via [`Fit::attr`]. A [`Fleet`] owns fits
//! and delivers gang boosts and cross-fit projections between them.
//!
//! ## Example
//!
//! ```rust
//! use fitstat::{
//!     Attribute, Domain, Effect, EffectCategory, Fit, ItemType, ModFilter,
//!     ModSrc, Modifier, Operator, Scope, SourceDataBuilder, State,
//! };
//! use std::sync::Arc;
//!
//! // A hull with 100 units of some attribute, and a module granting +20%.
//! let boost = Effect::new(10, EffectCategory::Passive).modifier(Modifier {
//!     state: State::Offline,
//!     scope: Scope::Local,
//!     domain: Domain::Ship,
//!     filter: ModFilter::Direct,
//!     operator: Operator::PostPercent,
//!     src: ModSrc::Literal(20.0),
//!     tgt_attr: 1,
//! });
//! let data = SourceDataBuilder::new()
//!     .attribute(Attribute::new(1))
//!     .item(ItemType::new(100, 4).attr(1, 100.0))
//!     .item(ItemType::new(200, 9).effect(Arc::new(boost)))
//!     .build();
//!
//! let mut fit = Fit::new(data);
//! let ship = fit.set_ship(100).unwrap();
//! fit.add_module(200, State::Offline).unwrap();
//! assert_eq!(fit.attr(ship, 1).unwrap(), 120.0);
//! ```
//!
//! ## Modules
//!
//! - [`defs`] - Shared identifiers, states and locations
//! - [`attr`] - Attribute metadata
//! - [`modifier`] - Modification rules
//! - [`effect`] - Effects bundling modifiers
//! - [`item`] / [`data`] - Item types and the assembled dataset
//! - [`handler`] / [`generator`] - Flat source tables and dataset generation
//! - [`holder`] / [`container`] - Item instances and ordered containers
//! - [`fit`] - The aggregate root
//! - [`restriction`] - Fit validation
//! - [`stats`] - Derived fit statistics
//! - [`fleet`] - Gang boosts and cross-fit projection
//! - [`diag`] - Structured diagnostics
//! - [`error`] - Error types

pub mod attr;
pub(crate) mod calc;
pub mod container;
pub mod data;
pub mod defs;
pub mod diag;
pub mod effect;
pub mod error;
pub mod fit;
pub mod fleet;
pub mod generator;
pub mod handler;
pub mod holder;
pub mod item;
pub mod modifier;
pub(crate) mod registry;
pub mod restriction;
pub mod stats;

// Re-export main types for convenience
pub use attr::Attribute;
pub use container::HolderList;
pub use data::{SourceData, SourceDataBuilder};
pub use defs::{AttrId, EffectId, GroupId, Location, State, TypeId};
pub use diag::{DiagRecord, DiagnosticsSink, Severity};
pub use effect::{Effect, EffectBuildStatus, EffectCategory};
pub use error::{CalcError, ContainerError, FitError, ValidationError};
pub use fit::Fit;
pub use fleet::{FitKey, Fleet, FleetError};
pub use generator::{generate, ModifierBuilder, NullModifierBuilder};
pub use handler::{DataHandler, MemoryDataHandler, Row};
pub use holder::{Holder, HolderId, HolderKind};
pub use item::ItemType;
pub use modifier::{Domain, ModFilter, ModSrc, Modifier, Operator, Scope};
pub use restriction::{
    DroneGroupRegister, RestrictionContext, RestrictionFailure, RestrictionRegister,
    RestrictionTracker,
};
pub use stats::{DroneBandwidth, ResistanceProfile, Volley};
