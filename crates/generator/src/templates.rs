//! Template loading and management

use crate::go::{go_type, METAV1_ALIAS};
use ack_generator_common::{FieldType, GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("go_type", go_type_filter);

    tera.add_raw_template("resource.go", include_str!("../templates/resource.go.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load resource.go template: {}", e))
        })?;

    tera.add_raw_template("types.go", include_str!("../templates/types.go.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load types.go template: {}", e))
        })?;

    tera.add_raw_template("sdk.go", include_str!("../templates/sdk.go.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load sdk.go template: {}", e))
        })?;

    Ok(tera)
}

/// Filter to convert a serialized FieldType to the Go type of an API
/// types field
fn go_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let field_type: FieldType = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("go_type filter expects a field type: {}", e)))?;
    let time = format!("{}.Time", METAV1_ALIAS);
    Ok(Value::String(go_type(&field_type, "", &time)))
}
