//! Smithy spec file parser

use super::types::SmithyModel;
use ack_generator_common::{GeneratorError, Result, ServiceModel};
use std::fs;
use std::path::Path;

/// Smithy model parser
///
/// Reads and parses Smithy JSON AST files from the AWS api-models-aws repository
pub struct SmithyParser {
    model: SmithyModel,
}

impl SmithyParser {
    /// Load Smithy model from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = SmithyParser::from_file("api-models-aws/sns/2010-03-31/sns-2010-03-31.json")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read Smithy file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse Smithy model from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let model: SmithyModel = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse Smithy JSON: {}", e)))?;

        Ok(Self { model })
    }

    /// Convert the Smithy model into a [`ServiceModel`]
    pub fn parse(&self) -> Result<ServiceModel> {
        super::converter::convert_smithy_to_service_model(&self.model)
    }

    /// Get reference to the underlying Smithy model
    pub fn model(&self) -> &SmithyModel {
        &self.model
    }
}
