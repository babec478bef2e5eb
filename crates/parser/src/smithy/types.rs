//! Smithy JSON AST type definitions
//!
//! These types represent the structure of Smithy JSON files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait values keyed by trait shape ID
pub type Traits = BTreeMap<String, serde_json::Value>;

/// Root Smithy model document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmithyModel {
    /// Smithy version (e.g., "2.0")
    pub smithy: String,

    /// Shape definitions keyed by absolute shape ID
    #[serde(default)]
    pub shapes: BTreeMap<String, Shape>,

    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A Smithy shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Service {
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        operations: Vec<ShapeReference>,
        #[serde(default)]
        resources: Vec<ShapeReference>,
        #[serde(default)]
        traits: Traits,
    },

    Operation {
        #[serde(default)]
        input: Option<ShapeReference>,
        #[serde(default)]
        output: Option<ShapeReference>,
        #[serde(default)]
        errors: Vec<ShapeReference>,
        #[serde(default)]
        traits: Traits,
    },

    /// Resource lifecycle bindings; only used to find operations
    Resource {
        #[serde(default)]
        create: Option<ShapeReference>,
        #[serde(default)]
        put: Option<ShapeReference>,
        #[serde(default)]
        read: Option<ShapeReference>,
        #[serde(default)]
        update: Option<ShapeReference>,
        #[serde(default)]
        delete: Option<ShapeReference>,
        #[serde(default)]
        list: Option<ShapeReference>,
        #[serde(default)]
        operations: Vec<ShapeReference>,
        #[serde(default)]
        collection_operations: Vec<ShapeReference>,
        #[serde(default)]
        resources: Vec<ShapeReference>,
    },

    Structure {
        #[serde(default)]
        members: BTreeMap<String, Member>,
        #[serde(default)]
        traits: Traits,
    },

    Union {
        #[serde(default)]
        members: BTreeMap<String, Member>,
    },

    List {
        member: ShapeReference,
        #[serde(default)]
        traits: Traits,
    },

    /// Smithy 1.0 sets behave like lists
    Set {
        member: ShapeReference,
        #[serde(default)]
        traits: Traits,
    },

    Map {
        key: ShapeReference,
        value: ShapeReference,
        #[serde(default)]
        traits: Traits,
    },

    String {
        #[serde(default)]
        traits: Traits,
    },
    Enum {
        #[serde(default)]
        traits: Traits,
    },
    Integer {
        #[serde(default)]
        traits: Traits,
    },
    IntEnum {
        #[serde(default)]
        traits: Traits,
    },
    Short {
        #[serde(default)]
        traits: Traits,
    },
    Byte {
        #[serde(default)]
        traits: Traits,
    },
    Long {
        #[serde(default)]
        traits: Traits,
    },
    Float {
        #[serde(default)]
        traits: Traits,
    },
    Double {
        #[serde(default)]
        traits: Traits,
    },
    Boolean {
        #[serde(default)]
        traits: Traits,
    },
    Timestamp {
        #[serde(default)]
        traits: Traits,
    },
    Blob {
        #[serde(default)]
        traits: Traits,
    },
    Document {
        #[serde(default)]
        traits: Traits,
    },

    /// Fallback for other shape types (bigInteger, bigDecimal, ...)
    #[serde(other)]
    Other,
}

/// Reference to another shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeReference {
    /// Target shape ID (e.g., "com.amazonaws.sns#Topic")
    pub target: String,
}

/// Structure member definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub target: String,
    #[serde(default)]
    pub traits: Traits,
}

impl SmithyModel {
    /// Find the service shape in the model
    pub fn find_service(&self) -> Option<(&String, &Shape)> {
        self.shapes
            .iter()
            .find(|(_, shape)| matches!(shape, Shape::Service { .. }))
    }

    pub fn get_shape(&self, shape_id: &str) -> Option<&Shape> {
        self.shapes.get(shape_id)
    }

    /// Strip the namespace from a shape ID.
    /// e.g., "com.amazonaws.sns#CreateTopic" -> "CreateTopic"
    pub fn local_name(shape_id: &str) -> &str {
        match shape_id.rfind('#') {
            Some(hash_pos) => &shape_id[hash_pos + 1..],
            None => shape_id,
        }
    }
}

impl Shape {
    /// Traits of shapes that carry them
    pub fn traits(&self) -> Option<&Traits> {
        match self {
            Shape::Service { traits, .. }
            | Shape::Operation { traits, .. }
            | Shape::Structure { traits, .. }
            | Shape::List { traits, .. }
            | Shape::Set { traits, .. }
            | Shape::Map { traits, .. }
            | Shape::String { traits }
            | Shape::Enum { traits }
            | Shape::Integer { traits }
            | Shape::IntEnum { traits }
            | Shape::Short { traits }
            | Shape::Byte { traits }
            | Shape::Long { traits }
            | Shape::Float { traits }
            | Shape::Double { traits }
            | Shape::Boolean { traits }
            | Shape::Timestamp { traits }
            | Shape::Blob { traits }
            | Shape::Document { traits } => Some(traits),
            Shape::Resource { .. } | Shape::Union { .. } | Shape::Other => None,
        }
    }
}

/// Smithy trait and prelude shape IDs
pub mod traits {
    pub const DOCUMENTATION: &str = "smithy.api#documentation";
    pub const REQUIRED: &str = "smithy.api#required";
    pub const ERROR: &str = "smithy.api#error";
    pub const AWS_SERVICE: &str = "aws.api#service";
    pub const PRELUDE_NAMESPACE: &str = "smithy.api#";
    pub const UNIT: &str = "smithy.api#Unit";
}
