//! Service model parsing
//!
//! This crate loads AWS service API models into the in-memory
//! [`ServiceModel`] shape graph that resource generation works on.
//!
//! ## Supported Formats
//!
//! - AWS JSON (`api-2.json`), as shipped with the AWS SDKs
//! - Smithy JSON AST, as published in `aws/api-models-aws`
//!
//! Both parsers produce members in lexical order and mark every
//! operation output shape as used-as-output.

pub mod api_json;
pub mod smithy;

pub use api_json::ApiModelParser;
pub use smithy::SmithyParser;

use ack_generator_common::{GeneratorError, Result, ServiceModel};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Service model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// AWS JSON (`api-2.json`)
    Api,
    /// Smithy JSON AST
    Smithy,
}

impl ModelFormat {
    /// Detect the format of a JSON document: Smithy documents carry a
    /// top-level `smithy` version key
    pub fn detect(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse model JSON: {}", e)))?;
        if value.get("smithy").is_some() {
            Ok(ModelFormat::Smithy)
        } else if value.get("metadata").is_some() {
            Ok(ModelFormat::Api)
        } else {
            Err(GeneratorError::Parse(
                "Unrecognised model format: expected a `smithy` or `metadata` key".to_string(),
            ))
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Api => write!(f, "api"),
            ModelFormat::Smithy => write!(f, "smithy"),
        }
    }
}

impl FromStr for ModelFormat {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "api" | "json" | "api-2" => Ok(ModelFormat::Api),
            "smithy" => Ok(ModelFormat::Smithy),
            other => Err(GeneratorError::Parse(format!("Unknown model format: {}", other))),
        }
    }
}

/// Parse a model document in `format`, detecting it when `None`
pub fn parse_model(json: &str, format: Option<ModelFormat>) -> Result<ServiceModel> {
    let format = match format {
        Some(format) => format,
        None => ModelFormat::detect(json)?,
    };
    match format {
        ModelFormat::Api => ApiModelParser::from_json(json)?.parse(),
        ModelFormat::Smithy => SmithyParser::from_json(json)?.parse(),
    }
}

/// Read and parse a model file
pub fn parse_model_file(path: &Path, format: Option<ModelFormat>) -> Result<ServiceModel> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GeneratorError::Parse(format!("Failed to read model file {}: {}", path.display(), e))
    })?;
    parse_model(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ModelFormat::detect(r#"{"smithy": "2.0", "shapes": {}}"#).unwrap(),
            ModelFormat::Smithy
        );
        assert_eq!(
            ModelFormat::detect(r#"{"metadata": {"serviceId": "SQS"}}"#).unwrap(),
            ModelFormat::Api
        );
        assert!(ModelFormat::detect(r#"{"openapi": "3.0.0"}"#).is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("Smithy".parse::<ModelFormat>().unwrap(), ModelFormat::Smithy);
        assert_eq!("api".parse::<ModelFormat>().unwrap(), ModelFormat::Api);
        assert!("openapi".parse::<ModelFormat>().is_err());
    }
}
