//! Converts an AWS JSON service model to the in-memory service model

use super::types::{ApiModel, ApiShape, ApiShapeRef};
use ack_generator_common::shape::{self as model, MemberRef, Operation, ScalarType, ServiceModel, ShapeKind};
use ack_generator_common::{GeneratorError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Convert an AWS JSON model to a [`ServiceModel`]
pub fn convert_api_to_service_model(api: &ApiModel) -> Result<ServiceModel> {
    let service_id = api
        .service_id()
        .ok_or_else(|| GeneratorError::Parse("Service model metadata has no serviceId".to_string()))?;

    let mut service = ServiceModel::new(service_id);
    service.api_version = api.metadata.api_version.clone();

    let mut errors = BTreeSet::new();
    for (name, op) in &api.operations {
        let mut operation = Operation::new(name);
        if let Some(input) = &op.input {
            operation = operation.with_input(&input.shape);
        }
        if let Some(output) = &op.output {
            operation = operation.with_output(&output.shape);
        }
        operation.documentation = op.documentation.clone();
        errors.extend(op.errors.iter().map(|e| e.shape.as_str()));
        service.add_operation(operation);
    }

    for (name, shape) in &api.shapes {
        let mut converted = model::Shape::new(name, convert_kind(name, shape)?);
        converted.exception = shape.exception || shape.fault || errors.contains(name.as_str());
        converted.documentation = shape.documentation.clone();
        service.add_shape(converted);
    }

    debug!(
        service = %service.service_id,
        shapes = service.shape_count(),
        operations = service.operation_count(),
        "converted AWS JSON model"
    );
    Ok(service.finish())
}

fn required_ref<'a>(name: &str, field: &str, reference: &'a Option<ApiShapeRef>) -> Result<&'a ApiShapeRef> {
    reference
        .as_ref()
        .ok_or_else(|| GeneratorError::Parse(format!("shape {} has no {}", name, field)))
}

fn convert_kind(name: &str, shape: &ApiShape) -> Result<ShapeKind> {
    let kind = match shape.shape_type.as_str() {
        "structure" => ShapeKind::Structure {
            members: shape
                .members
                .iter()
                .map(|(member_name, member)| {
                    let mut converted = MemberRef::new(member_name, &member.shape);
                    converted.required = shape.required.contains(member_name);
                    converted.documentation = member.documentation.clone();
                    converted
                })
                .collect(),
        },
        "list" => ShapeKind::List {
            member: model::ShapeRef::new(&required_ref(name, "member", &shape.member)?.shape),
        },
        "map" => ShapeKind::Map {
            key: model::ShapeRef::new(&required_ref(name, "key", &shape.key)?.shape),
            value: model::ShapeRef::new(&required_ref(name, "value", &shape.value)?.shape),
        },
        "string" => ShapeKind::Scalar(ScalarType::String),
        "integer" => ShapeKind::Scalar(ScalarType::Integer),
        "long" => ShapeKind::Scalar(ScalarType::Long),
        "float" => ShapeKind::Scalar(ScalarType::Float),
        "double" => ShapeKind::Scalar(ScalarType::Double),
        "boolean" => ShapeKind::Scalar(ScalarType::Boolean),
        "timestamp" => ShapeKind::Scalar(ScalarType::Timestamp),
        "blob" => ShapeKind::Scalar(ScalarType::Blob),
        other => ShapeKind::Unsupported(other.to_string()),
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(json: &str) -> ApiShape {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_structure_members_carry_required() {
        let kind = convert_kind(
            "CreateTopicInput",
            &shape(r#"{"type": "structure", "required": ["Name"], "members": {"Name": {"shape": "topicName"}, "Tags": {"shape": "TagList"}}}"#),
        )
        .unwrap();
        let ShapeKind::Structure { members } = kind else {
            panic!("expected a structure");
        };
        assert_eq!(members.len(), 2);
        assert!(members[0].required);
        assert_eq!(members[0].target.shape_name, "topicName");
        assert!(!members[1].required);
    }

    #[test]
    fn test_list_without_member_is_parse_error() {
        let err = convert_kind("TagList", &shape(r#"{"type": "list"}"#)).unwrap_err();
        assert!(matches!(err, GeneratorError::Parse(ref m) if m.contains("TagList")));
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let kind = convert_kind("Doc", &shape(r#"{"type": "document"}"#)).unwrap();
        assert_eq!(kind, ShapeKind::Unsupported("document".to_string()));
    }
}
