//! In-memory service model: a graph of named shapes and operations.
//!
//! Shapes reference each other by name. A reference whose target is not
//! defined in the model is a model-integrity fault, reported through
//! [`ServiceModel::resolve`].

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Scalar shape types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Timestamp,
    Blob,
}

/// Reference to a named shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRef {
    pub shape_name: String,
}

impl ShapeRef {
    pub fn new(shape_name: impl Into<String>) -> Self {
        Self {
            shape_name: shape_name.into(),
        }
    }
}

/// A structure member: a named reference to another shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// Original (wire-level) member name
    pub name: String,
    pub target: ShapeRef,
    #[serde(default)]
    pub required: bool,
    /// Whether the member is held behind a pointer-like indirection, so that
    /// "absent" is distinguishable from the zero value
    #[serde(default)]
    pub indirection: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl MemberRef {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: ShapeRef::new(target),
            required: false,
            indirection: false,
            documentation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// The structural kind of a shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Members in declared order
    Structure { members: Vec<MemberRef> },
    List { member: ShapeRef },
    Map { key: ShapeRef, value: ShapeRef },
    Scalar(ScalarType),
    /// A shape type with no field mapping (e.g. Smithy documents)
    Unsupported(String),
}

/// A named node in the service model graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    /// Set when the shape is the output of at least one operation
    #[serde(default)]
    pub used_as_output: bool,
    /// Set when the shape describes a service exception
    #[serde(default)]
    pub exception: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl Shape {
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            used_as_output: false,
            exception: false,
            documentation: None,
        }
    }

    pub fn structure(name: impl Into<String>, members: Vec<MemberRef>) -> Self {
        Self::new(name, ShapeKind::Structure { members })
    }

    pub fn list(name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(
            name,
            ShapeKind::List {
                member: ShapeRef::new(member),
            },
        )
    }

    pub fn map(name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            ShapeKind::Map {
                key: ShapeRef::new(key),
                value: ShapeRef::new(value),
            },
        )
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, ShapeKind::Scalar(scalar))
    }

    pub fn exception(mut self) -> Self {
        self.exception = true;
        self
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ShapeKind::Structure { .. })
    }

    /// Structure members in declared order; empty for any other kind
    pub fn members(&self) -> &[MemberRef] {
        match &self.kind {
            ShapeKind::Structure { members } => members,
            _ => &[],
        }
    }

    /// Look up a structure member by its original name
    pub fn member(&self, name: &str) -> Option<&MemberRef> {
        self.members().iter().find(|m| m.name == name)
    }

    /// Type label as used by AWS service models ("structure", "list", ...)
    pub fn type_label(&self) -> &str {
        match &self.kind {
            ShapeKind::Structure { .. } => "structure",
            ShapeKind::List { .. } => "list",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Scalar(ScalarType::String) => "string",
            ShapeKind::Scalar(ScalarType::Integer) => "integer",
            ShapeKind::Scalar(ScalarType::Long) => "long",
            ShapeKind::Scalar(ScalarType::Float) => "float",
            ShapeKind::Scalar(ScalarType::Double) => "double",
            ShapeKind::Scalar(ScalarType::Boolean) => "boolean",
            ShapeKind::Scalar(ScalarType::Timestamp) => "timestamp",
            ShapeKind::Scalar(ScalarType::Blob) => "blob",
            ShapeKind::Unsupported(label) => label,
        }
    }
}

/// A named service API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub input: Option<ShapeRef>,
    #[serde(default)]
    pub output: Option<ShapeRef>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            output: None,
            documentation: None,
        }
    }

    pub fn with_input(mut self, shape_name: impl Into<String>) -> Self {
        self.input = Some(ShapeRef::new(shape_name));
        self
    }

    pub fn with_output(mut self, shape_name: impl Into<String>) -> Self {
        self.output = Some(ShapeRef::new(shape_name));
        self
    }
}

/// A whole service API model
///
/// Shapes and operations are keyed by name and always iterated in lexical
/// order, so every traversal over the model is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceModel {
    /// Service identifier (e.g. "SNS")
    pub service_id: String,
    /// Package / module name used for generated code (e.g. "sns")
    pub package_name: String,
    #[serde(default)]
    pub api_version: Option<String>,
    shapes: BTreeMap<String, Shape>,
    operations: BTreeMap<String, Operation>,
}

impl ServiceModel {
    pub fn new(service_id: impl Into<String>) -> Self {
        let service_id = service_id.into();
        let package_name = service_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self {
            service_id,
            package_name,
            api_version: None,
            shapes: BTreeMap::new(),
            operations: BTreeMap::new(),
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.add_shape(shape);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.add_operation(operation);
        self
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.insert(shape.name.clone(), shape);
    }

    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.insert(operation.name.clone(), operation);
    }

    /// Derive the flags that depend on the whole graph.
    ///
    /// Marks every operation output shape as `used_as_output` and sets
    /// `indirection` on structure members that target non-blob scalars.
    /// Parsers call this once after all shapes and operations are added.
    pub fn finish(mut self) -> Self {
        let outputs: BTreeSet<String> = self
            .operations
            .values()
            .filter_map(|op| op.output.as_ref().map(|r| r.shape_name.clone()))
            .collect();

        let scalar_targets: BTreeSet<String> = self
            .shapes
            .values()
            .filter(|s| {
                matches!(s.kind, ShapeKind::Scalar(t) if t != ScalarType::Blob)
            })
            .map(|s| s.name.clone())
            .collect();

        for shape in self.shapes.values_mut() {
            if outputs.contains(&shape.name) {
                shape.used_as_output = true;
            }
            if let ShapeKind::Structure { members } = &mut shape.kind {
                for member in members.iter_mut() {
                    member.indirection = scalar_targets.contains(&member.target.shape_name);
                }
            }
        }
        self
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    /// Resolve a shape reference, reporting a dangling reference as a
    /// model-integrity fault
    pub fn resolve(&self, shape_ref: &ShapeRef, context: &str) -> Result<&Shape> {
        self.shapes
            .get(&shape_ref.shape_name)
            .ok_or_else(|| GeneratorError::NilShapePointer {
                shape: shape_ref.shape_name.clone(),
                context: context.to_string(),
            })
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Names of every shape used directly as an operation input or output
    pub fn payload_shape_names(&self) -> BTreeSet<&str> {
        self.operations
            .values()
            .flat_map(|op| op.input.iter().chain(op.output.iter()))
            .map(|r| r.shape_name.as_str())
            .collect()
    }
}
