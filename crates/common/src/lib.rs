//! Common types and utilities for the ACK generator
//!
//! This crate contains the in-memory service model (shapes and operations),
//! the naming utility, the per-service generator configuration and the error
//! types used across the parser, model, generator, and CLI components.

pub mod config;
pub mod names;
pub mod shape;

pub use config::GeneratorConfig;
pub use names::{DefaultNamer, Namer, Names};
pub use shape::{MemberRef, Operation, ScalarType, ServiceModel, Shape, ShapeKind, ShapeRef};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during resource generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A shape reference names a shape that the model does not define
    #[error("found nil Shape pointer: shape {shape:?} referenced from {context}")]
    NilShapePointer { shape: String, context: String },

    /// Every Create operation must declare an input shape
    #[error("operation {operation} has no input shape")]
    MissingInputShape { operation: String },

    /// Shape containment revisited a shape already on the current path
    #[error("shape cycle detected: {}", path.join(" -> "))]
    ShapeCycle { path: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Whether this error means the service model itself is inconsistent.
    ///
    /// Model-integrity faults abort the whole generation run; nothing about
    /// them is recoverable per resource.
    pub fn is_model_integrity(&self) -> bool {
        matches!(
            self,
            GeneratorError::NilShapePointer { .. }
                | GeneratorError::MissingInputShape { .. }
                | GeneratorError::ShapeCycle { .. }
        )
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// The role an operation plays for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpType {
    Create,
    /// Creates several resources in one call; never a resource's Create
    CreateBatch,
    /// ReadOne
    #[serde(alias = "ReadOne")]
    Get,
    /// ReadMany
    #[serde(alias = "ReadMany")]
    List,
    Update,
    Delete,
    GetAttributes,
    SetAttributes,
}

impl OpType {
    /// All roles that a resource model can bind an operation to
    pub const RESOURCE_ROLES: [OpType; 7] = [
        OpType::Create,
        OpType::Get,
        OpType::List,
        OpType::Update,
        OpType::Delete,
        OpType::GetAttributes,
        OpType::SetAttributes,
    ];

    /// Short label used in summaries (e.g. "C", "R", "GA")
    pub fn short_label(&self) -> &'static str {
        match self {
            OpType::Create => "C",
            OpType::CreateBatch => "CB",
            OpType::Get => "R",
            OpType::List => "L",
            OpType::Update => "U",
            OpType::Delete => "D",
            OpType::GetAttributes => "GA",
            OpType::SetAttributes => "SA",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpType::Create => "Create",
            OpType::CreateBatch => "CreateBatch",
            OpType::Get => "Get",
            OpType::List => "List",
            OpType::Update => "Update",
            OpType::Delete => "Delete",
            OpType::GetAttributes => "GetAttributes",
            OpType::SetAttributes => "SetAttributes",
        };
        f.write_str(s)
    }
}

impl FromStr for OpType {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(OpType::Create),
            "createbatch" | "create_batch" => Ok(OpType::CreateBatch),
            "get" | "readone" | "read_one" => Ok(OpType::Get),
            "list" | "readmany" | "read_many" => Ok(OpType::List),
            "update" => Ok(OpType::Update),
            "delete" => Ok(OpType::Delete),
            "getattributes" | "get_attributes" => Ok(OpType::GetAttributes),
            "setattributes" | "set_attributes" => Ok(OpType::SetAttributes),
            other => Err(GeneratorError::Config(format!(
                "unknown operation type: {}",
                other
            ))),
        }
    }
}

/// Resolved type of a Spec/Status field or type definition attribute.
///
/// This is a language-agnostic descriptor; renderers map it onto concrete
/// target-language types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Blob,
    /// A named nested type (a TypeDef or an SDK structure)
    Structure(String),
    List(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    /// Map a scalar shape type onto its field type
    pub fn from_scalar(scalar: ScalarType) -> FieldType {
        match scalar {
            ScalarType::String => FieldType::String,
            ScalarType::Integer | ScalarType::Long => FieldType::Integer,
            ScalarType::Float | ScalarType::Double => FieldType::Float,
            ScalarType::Boolean => FieldType::Boolean,
            ScalarType::Timestamp => FieldType::DateTime,
            ScalarType::Blob => FieldType::Blob,
        }
    }

    /// Whether any part of this type is a timestamp
    pub fn contains_date_time(&self) -> bool {
        match self {
            FieldType::DateTime => true,
            FieldType::List(elem) => elem.contains_date_time(),
            FieldType::Map(key, value) => key.contains_date_time() || value.contains_date_time(),
            _ => false,
        }
    }

    /// Whether this is a scalar (non-container, non-structure) type
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            FieldType::Structure(_) | FieldType::List(_) | FieldType::Map(_, _)
        )
    }
}
