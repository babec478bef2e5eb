//! AWS JSON service model type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of an `api-2.json` document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiModel {
    pub metadata: Metadata,
    #[serde(default)]
    pub operations: BTreeMap<String, ApiOperation>,
    #[serde(default)]
    pub shapes: BTreeMap<String, ApiShape>,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub service_abbreviation: Option<String>,
    #[serde(default)]
    pub endpoint_prefix: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOperation {
    #[serde(default)]
    pub input: Option<ApiShapeRef>,
    #[serde(default)]
    pub output: Option<ApiShapeRef>,
    #[serde(default)]
    pub errors: Vec<ApiShapeRef>,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// Reference to a shape by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiShapeRef {
    pub shape: String,
    /// Query protocol result element name (e.g. `CreateTopicResult`)
    #[serde(default)]
    pub result_wrapper: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// A shape of any type; which fields are set depends on `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiShape {
    #[serde(rename = "type")]
    pub shape_type: String,
    #[serde(default)]
    pub members: BTreeMap<String, ApiShapeRef>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub member: Option<ApiShapeRef>,
    #[serde(default)]
    pub key: Option<ApiShapeRef>,
    #[serde(default)]
    pub value: Option<ApiShapeRef>,
    #[serde(default)]
    pub exception: bool,
    #[serde(default)]
    pub fault: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl ApiModel {
    /// Service identifier: `serviceId`, else the abbreviation, else the
    /// endpoint prefix
    pub fn service_id(&self) -> Option<&str> {
        self.metadata
            .service_id
            .as_deref()
            .or(self.metadata.service_abbreviation.as_deref())
            .or(self.metadata.endpoint_prefix.as_deref())
    }
}
