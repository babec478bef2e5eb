//! Per-service generator configuration loaded from `generator.yaml`
//!
//! Service models do not describe everything the generator needs. Which
//! keys an attribute map carries, which resources to skip, and which
//! operations follow no naming convention all come from here.

use crate::{GeneratorError, OpType, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Root of a `generator.yaml` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Things the generator must not emit
    pub ignore: IgnoreConfig,
    /// Classifier overrides keyed by exact operation name
    pub operations: BTreeMap<String, OperationOverride>,
    /// Classifier overrides matched by regular expression, in file order
    pub operation_patterns: Vec<OperationPattern>,
    /// Per-resource settings keyed by resource name (e.g. "Topic")
    pub resources: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub resource_names: Vec<String>,
    pub operations: Vec<String>,
    pub shape_names: Vec<String>,
}

/// Binds one operation to a role and resource regardless of its name
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperationOverride {
    pub operation_type: OpType,
    pub resource_name: String,
}

/// Binds every operation matching `pattern` to a role and resource.
///
/// `resource_name` may reference capture groups (`$1`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperationPattern {
    pub pattern: String,
    pub operation_type: OpType,
    pub resource_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub unpack_attributes_map: Option<UnpackAttributesMapConfig>,
    pub renames: Option<RenamesConfig>,
}

/// Known keys of a generic string-to-string attribute map
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UnpackAttributesMapConfig {
    /// Name of the map member on request and response shapes
    #[serde(default = "default_map_member")]
    pub map_member: String,
    #[serde(default)]
    pub fields: BTreeMap<String, AttributeFieldConfig>,
}

fn default_map_member() -> String {
    "Attributes".to_string()
}

impl Default for UnpackAttributesMapConfig {
    fn default() -> Self {
        Self {
            map_member: default_map_member(),
            fields: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AttributeFieldConfig {
    /// Observed state only; becomes a Status field
    pub is_read_only: bool,
    /// Holds the resource ARN
    pub is_primary_identifier: bool,
    /// Holds the owning AWS account ID
    pub contains_owner_account_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenamesConfig {
    /// Keyed by operation name
    pub operations: BTreeMap<String, OperationRenames>,
}

/// Member renames for one operation, keyed by wire member name
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OperationRenames {
    pub input_fields: BTreeMap<String, String>,
    pub output_fields: BTreeMap<String, String>,
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read generator config {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            GeneratorError::Config(format!(
                "Failed to parse generator config {:?}: {}",
                path, e
            ))
        })
    }

    /// Load configuration if a path is given and exists, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn is_ignored_resource(&self, resource_name: &str) -> bool {
        self.ignore.resource_names.iter().any(|r| r == resource_name)
    }

    pub fn is_ignored_operation(&self, operation_name: &str) -> bool {
        self.ignore.operations.iter().any(|o| o == operation_name)
    }

    pub fn is_ignored_shape(&self, shape_name: &str) -> bool {
        self.ignore.shape_names.iter().any(|s| s == shape_name)
    }

    pub fn resource(&self, resource_name: &str) -> Option<&ResourceConfig> {
        self.resources.get(resource_name)
    }

    /// Attribute map settings for a resource, if it unpacks one
    pub fn attributes_map(&self, resource_name: &str) -> Option<&UnpackAttributesMapConfig> {
        self.resource(resource_name)
            .and_then(|r| r.unpack_attributes_map.as_ref())
    }

    /// Renamed name of an input member of `operation`, if configured
    pub fn input_rename(&self, resource_name: &str, operation: &str, member: &str) -> Option<&str> {
        self.operation_renames(resource_name, operation)
            .and_then(|r| r.input_fields.get(member))
            .map(String::as_str)
    }

    /// Renamed name of an output member of `operation`, if configured
    pub fn output_rename(&self, resource_name: &str, operation: &str, member: &str) -> Option<&str> {
        self.operation_renames(resource_name, operation)
            .and_then(|r| r.output_fields.get(member))
            .map(String::as_str)
    }

    fn operation_renames(&self, resource_name: &str, operation: &str) -> Option<&OperationRenames> {
        self.resource(resource_name)
            .and_then(|r| r.renames.as_ref())
            .and_then(|r| r.operations.get(operation))
    }
}
