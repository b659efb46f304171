//! Dataset generation: flat source tables to [`SourceData`].
//!
//! The generator never fails. Rows it cannot use are dropped with a
//! diagnostic, duplicate default effects are demoted, and whatever
//! survives becomes the dataset. Modifier reconstruction from raw
//! expressions is delegated to a [`ModifierBuilder`], since expression
//! trees are a concern of the data format rather than of the engine.

use crate::attr::Attribute;
use crate::data::{SourceData, SourceDataBuilder};
use crate::defs::{attrs, AttrId, EffectId, TypeId};
use crate::diag::DiagnosticsSink;
use crate::effect::{Effect, EffectBuildStatus, EffectCategory};
use crate::handler::{row_bool, row_f64, row_u32, DataHandler, Row};
use crate::item::ItemType;
use crate::modifier::Modifier;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Reconstructs an effect's modifiers from its row and the raw
/// expression table.
pub trait ModifierBuilder {
    /// Build the modifiers for one effect.
    fn build(&self, effect_row: &Row, expressions: &[Row]) -> (Vec<Modifier>, EffectBuildStatus);
}

/// Builder that reconstructs nothing; every effect comes out empty and
/// fully built. Useful when modifiers are supplied another way.
#[derive(Debug, Default)]
pub struct NullModifierBuilder;

impl ModifierBuilder for NullModifierBuilder {
    fn build(&self, _effect_row: &Row, _expressions: &[Row]) -> (Vec<Modifier>, EffectBuildStatus) {
        (Vec::new(), EffectBuildStatus::OkFull)
    }
}

/// Columns a row must carry to survive cleanup, per table.
const REQUIRED: &[(&str, &[&str])] = &[
    ("invtypes", &["typeID", "groupID"]),
    ("invgroups", &["groupID"]),
    ("dgmattribs", &["attributeID"]),
    ("dgmtypeattribs", &["typeID", "attributeID", "value"]),
    ("dgmeffects", &["effectID", "effectCategory"]),
    ("dgmtypeeffects", &["typeID", "effectID", "isDefault"]),
    ("dgmexpressions", &["expressionID"]),
];

/// Run the full generation pass.
pub fn generate(
    handler: &dyn DataHandler,
    builder: &dyn ModifierBuilder,
    diag: &DiagnosticsSink,
) -> Arc<SourceData> {
    let mut tables: HashMap<&str, Vec<Row>> = HashMap::new();
    tables.insert("invtypes", handler.get_invtypes());
    tables.insert("invgroups", handler.get_invgroups());
    tables.insert("dgmattribs", handler.get_dgmattribs());
    tables.insert("dgmtypeattribs", handler.get_dgmtypeattribs());
    tables.insert("dgmeffects", handler.get_dgmeffects());
    tables.insert("dgmtypeeffects", handler.get_dgmtypeeffects());
    tables.insert("dgmexpressions", handler.get_dgmexpressions());

    cleanup(&mut tables, diag);
    let type_effects = normalize_default_effects(&tables, diag);
    assemble(&tables, &type_effects, handler.get_version(), builder, diag)
}

/// Drop rows missing required columns, reporting row counts before and
/// after.
fn cleanup(tables: &mut HashMap<&str, Vec<Row>>, diag: &DiagnosticsSink) {
    let before: usize = tables.values().map(Vec::len).sum();
    diag.info("generator", format!("{before} rows before cleanup"));
    for (table, columns) in REQUIRED {
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| {
                columns
                    .iter()
                    .all(|c| row.get(*c).is_some_and(|v| !v.is_null()))
            });
        }
    }
    let after: usize = tables.values().map(Vec::len).sum();
    diag.info("generator", format!("{after} rows after cleanup"));
}

/// Per type: first default effect wins, the rest are demoted.
///
/// Returns type-to-effects links with a resolved single default per type.
fn normalize_default_effects(
    tables: &HashMap<&str, Vec<Row>>,
    diag: &DiagnosticsSink,
) -> Vec<(TypeId, EffectId, bool)> {
    let mut links = Vec::new();
    let mut has_default: HashSet<TypeId> = HashSet::new();
    let mut excessive = 0usize;
    if let Some(rows) = tables.get("dgmtypeeffects") {
        for row in rows {
            let (Some(type_id), Some(effect_id)) =
                (row_u32(row, "typeID"), row_u32(row, "effectID"))
            else {
                continue;
            };
            let mut is_default = row_bool(row, "isDefault").unwrap_or(false);
            if is_default && !has_default.insert(type_id) {
                excessive += 1;
                is_default = false;
            }
            links.push((type_id, effect_id, is_default));
        }
    }
    if excessive > 0 {
        diag.warn(
            "generator",
            format!("data contains {excessive} excessive default effects, marking them as non-default"),
        );
    }
    links
}

fn assemble(
    tables: &HashMap<&str, Vec<Row>>,
    type_effects: &[(TypeId, EffectId, bool)],
    version: Option<String>,
    builder: &dyn ModifierBuilder,
    diag: &DiagnosticsSink,
) -> Arc<SourceData> {
    let empty = Vec::new();
    let expressions = tables.get("dgmexpressions").unwrap_or(&empty);

    // Effects referenced by at least one surviving type link.
    let referenced: HashSet<EffectId> = type_effects.iter().map(|(_, e, _)| *e).collect();
    let mut effects: HashMap<EffectId, Arc<Effect>> = HashMap::new();
    for row in tables.get("dgmeffects").unwrap_or(&empty) {
        let Some(effect_id) = row_u32(row, "effectID") else {
            continue;
        };
        if !referenced.contains(&effect_id) {
            continue;
        }
        let Some(category) = row_u32(row, "effectCategory").and_then(effect_category) else {
            diag.warn(
                "generator",
                format!("effect {effect_id} has unknown category, skipping it"),
            );
            continue;
        };
        let (modifiers, status) = builder.build(row, expressions);
        if status == EffectBuildStatus::Error {
            diag.error(
                "generator",
                format!("failed to build modifiers for effect {effect_id}"),
            );
        }
        let mut effect = Effect::new(effect_id, category).build_status(status);
        effect.modifiers = modifiers;
        effects.insert(effect_id, Arc::new(effect));
    }

    // Per-type attribute values and the skill requirements derived from
    // the well-known requirement slots.
    let mut type_attrs: HashMap<TypeId, HashMap<AttrId, f64>> = HashMap::new();
    let mut type_skills: HashMap<TypeId, Vec<TypeId>> = HashMap::new();
    for row in tables.get("dgmtypeattribs").unwrap_or(&empty) {
        let (Some(type_id), Some(attr_id), Some(value)) = (
            row_u32(row, "typeID"),
            row_u32(row, "attributeID"),
            row_f64(row, "value"),
        ) else {
            continue;
        };
        type_attrs.entry(type_id).or_default().insert(attr_id, value);
        if attrs::REQUIRED_SKILLS.contains(&attr_id) {
            type_skills.entry(type_id).or_default().push(value as TypeId);
        }
    }

    let mut data = SourceDataBuilder::new();
    for row in tables.get("dgmattribs").unwrap_or(&empty) {
        let Some(attr_id) = row_u32(row, "attributeID") else {
            continue;
        };
        let mut attr = Attribute::new(attr_id)
            .high_is_good(row_bool(row, "highIsGood").unwrap_or(true))
            .stackable(row_bool(row, "stackable").unwrap_or(true));
        if let Some(default) = row_f64(row, "defaultValue") {
            attr = attr.default_value(default);
        }
        data = data.attribute(attr);
    }

    for row in tables.get("invtypes").unwrap_or(&empty) {
        let (Some(type_id), Some(group_id)) = (row_u32(row, "typeID"), row_u32(row, "groupID"))
        else {
            continue;
        };
        let mut item = ItemType::new(type_id, group_id);
        if let Some(values) = type_attrs.remove(&type_id) {
            item.attrs = values;
        }
        if let Some(skills) = type_skills.remove(&type_id) {
            item.required_skills = skills;
        }
        for (link_type, effect_id, is_default) in type_effects {
            if *link_type != type_id {
                continue;
            }
            if let Some(effect) = effects.get(effect_id) {
                item = item.effect(Arc::clone(effect));
                if *is_default {
                    item = item.default_effect(*effect_id);
                }
            }
        }
        data = data.item(item);
    }

    for effect in effects.values() {
        data = data.effect(Effect::clone(effect));
    }
    if let Some(version) = version {
        data = data.version(version);
    }
    data.build()
}

fn effect_category(raw: u32) -> Option<EffectCategory> {
    match raw {
        0 => Some(EffectCategory::Passive),
        1 => Some(EffectCategory::Active),
        2 => Some(EffectCategory::Target),
        3 => Some(EffectCategory::Area),
        4 => Some(EffectCategory::Online),
        5 => Some(EffectCategory::Overload),
        6 => Some(EffectCategory::Dungeon),
        7 => Some(EffectCategory::System),
        _ => None,
    }
}
