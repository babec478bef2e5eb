//! Nested structure types referenced by resource fields

use crate::types::{Side, TypeResolver};
use ack_generator_common::config::GeneratorConfig;
use ack_generator_common::{FieldType, Names, Namer, Result, ServiceModel};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// One member of a [`TypeDef`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub names: Names,
    pub field_type: FieldType,
    pub shape_name: String,
}

/// A structure shape rendered as a standalone type next to the resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    pub names: Names,
    /// Generated type name, suffixed when it collides with a resource's
    /// Spec or Status struct
    pub type_name: String,
    /// Keyed by original member name
    pub attrs: BTreeMap<String, Attr>,
}

impl TypeDef {
    pub fn has_date_time(&self) -> bool {
        self.attrs.values().any(|a| a.field_type.contains_date_time())
    }
}

/// Collect a [`TypeDef`] for every structure shape that is not a
/// resource, an operation payload or an exception, sorted by camel-case
/// name
pub(crate) fn build_type_defs(
    model: &ServiceModel,
    config: &GeneratorConfig,
    namer: &dyn Namer,
    types: &TypeResolver<'_>,
    kinds: &BTreeSet<String>,
) -> Result<Vec<TypeDef>> {
    let payloads = model.payload_shape_names();
    let mut defs = Vec::new();

    for shape in model.shapes().filter(|s| s.is_structure()) {
        if shape.exception || payloads.contains(shape.name.as_str()) || config.is_ignored_shape(&shape.name) {
            continue;
        }
        let names = namer.names(&shape.name);
        if kinds.contains(&names.camel) {
            continue;
        }

        let mut attrs = BTreeMap::new();
        for member in shape.members() {
            let context = format!("{}.{}", shape.name, member.name);
            let member_shape = model.resolve(&member.target, &context)?;
            let Some(field_type) = types.field_type(member_shape, Side::Crd)? else {
                trace!(shape = %shape.name, member = %member.name, "no type mapping; attribute skipped");
                continue;
            };
            attrs.insert(
                member.name.clone(),
                Attr {
                    names: namer.names(&member.name),
                    field_type,
                    shape_name: member_shape.name.clone(),
                },
            );
        }
        if attrs.is_empty() {
            continue;
        }

        defs.push(TypeDef {
            type_name: types.crd_type_name(&shape.name),
            names,
            attrs,
        });
    }

    defs.sort_by(|a, b| a.names.camel.cmp(&b.names.camel));
    Ok(defs)
}
