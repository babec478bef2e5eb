//! AWS JSON service model file parser

use super::types::ApiModel;
use ack_generator_common::{GeneratorError, Result, ServiceModel};
use std::fs;
use std::path::Path;

/// AWS JSON service model parser
pub struct ApiModelParser {
    model: ApiModel,
}

impl ApiModelParser {
    /// Load a service model from an `api-2.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read service model {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: ApiModel = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse service model JSON: {}", e)))?;

        Ok(Self { model })
    }

    /// Convert the document into a [`ServiceModel`]
    pub fn parse(&self) -> Result<ServiceModel> {
        super::converter::convert_api_to_service_model(&self.model)
    }

    pub fn model(&self) -> &ApiModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_model() {
        let json = r#"{
            "version": "2.0",
            "metadata": {"apiVersion": "2010-03-31", "serviceId": "SNS", "protocol": "query"},
            "operations": {},
            "shapes": {}
        }"#;

        let service = ApiModelParser::from_json(json).unwrap().parse().unwrap();
        assert_eq!(service.service_id, "SNS");
        assert_eq!(service.package_name, "sns");
        assert_eq!(service.api_version.as_deref(), Some("2010-03-31"));
    }

    #[test]
    fn test_missing_service_id_is_parse_error() {
        let parser = ApiModelParser::from_json(r#"{"metadata": {}}"#).unwrap();
        assert!(matches!(parser.parse(), Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            ApiModelParser::from_json("{"),
            Err(GeneratorError::Parse(_))
        ));
    }
}
