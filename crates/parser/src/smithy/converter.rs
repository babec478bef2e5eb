//! Converts a Smithy model to the in-memory service model

use super::types::{traits, Member, Shape, ShapeReference, SmithyModel, Traits};
use ack_generator_common::shape::{self as model, MemberRef, Operation, ScalarType, ServiceModel, ShapeKind};
use ack_generator_common::{GeneratorError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Convert a Smithy model to a [`ServiceModel`]
pub fn convert_smithy_to_service_model(smithy: &SmithyModel) -> Result<ServiceModel> {
    let (service_id, service_shape) = smithy
        .find_service()
        .ok_or_else(|| GeneratorError::Parse("No service shape found in Smithy model".to_string()))?;

    let Shape::Service {
        version,
        operations,
        resources,
        traits: service_traits,
    } = service_shape
    else {
        return Err(GeneratorError::Parse(format!("{} is not a service", service_id)));
    };

    let mut service = ServiceModel::new(sdk_id(service_id, service_traits));
    service.api_version = version.clone();

    let mut operation_ids = BTreeSet::new();
    operation_ids.extend(operations.iter().map(|r| r.target.clone()));
    collect_resource_operations(smithy, resources, &mut operation_ids);

    let mut errors = BTreeSet::new();
    for op_id in &operation_ids {
        let Some(Shape::Operation {
            input,
            output,
            errors: op_errors,
            traits: op_traits,
        }) = smithy.get_shape(op_id)
        else {
            return Err(GeneratorError::Parse(format!("Operation shape {} not found", op_id)));
        };

        let mut operation = Operation::new(SmithyModel::local_name(op_id));
        if let Some(input) = non_unit(input) {
            operation = operation.with_input(SmithyModel::local_name(&input.target));
        }
        if let Some(output) = non_unit(output) {
            operation = operation.with_output(SmithyModel::local_name(&output.target));
        }
        operation.documentation = documentation(op_traits);
        errors.extend(op_errors.iter().map(|e| SmithyModel::local_name(&e.target).to_string()));
        service.add_operation(operation);
    }

    let mut prelude = BTreeSet::new();
    for (shape_id, shape) in &smithy.shapes {
        let name = SmithyModel::local_name(shape_id);
        let Some(kind) = convert_kind(shape, &mut prelude) else {
            continue;
        };
        let mut converted = model::Shape::new(name, kind);
        if let Some(shape_traits) = shape.traits() {
            converted.documentation = documentation(shape_traits);
            converted.exception = shape_traits.contains_key(traits::ERROR);
        }
        converted.exception |= errors.contains(name);
        service.add_shape(converted);
    }

    for name in prelude {
        if service.shape(&name).is_none() {
            if let Some(kind) = prelude_kind(&name) {
                service.add_shape(model::Shape::new(name, kind));
            }
        }
    }

    debug!(
        service = %service.service_id,
        shapes = service.shape_count(),
        operations = service.operation_count(),
        "converted Smithy model"
    );
    Ok(service.finish())
}

/// `sdkId` of the `aws.api#service` trait, else the service's local name
fn sdk_id(service_id: &str, service_traits: &Traits) -> String {
    service_traits
        .get(traits::AWS_SERVICE)
        .and_then(|t| t.get("sdkId"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| SmithyModel::local_name(service_id).to_string())
}

/// Operations bound to resources, recursively through child resources
fn collect_resource_operations(smithy: &SmithyModel, resources: &[ShapeReference], out: &mut BTreeSet<String>) {
    for resource_ref in resources {
        let Some(Shape::Resource {
            create,
            put,
            read,
            update,
            delete,
            list,
            operations,
            collection_operations,
            resources,
        }) = smithy.get_shape(&resource_ref.target)
        else {
            continue;
        };
        let lifecycle = [create, put, read, update, delete, list];
        out.extend(lifecycle.into_iter().flatten().map(|r| r.target.clone()));
        out.extend(operations.iter().chain(collection_operations).map(|r| r.target.clone()));
        collect_resource_operations(smithy, resources, out);
    }
}

fn non_unit(reference: &Option<ShapeReference>) -> Option<&ShapeReference> {
    reference.as_ref().filter(|r| r.target != traits::UNIT)
}

fn documentation(shape_traits: &Traits) -> Option<String> {
    shape_traits
        .get(traits::DOCUMENTATION)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Member reference to a shape, recording prelude targets that need a
/// definition
fn shape_ref(target: &str, prelude: &mut BTreeSet<String>) -> model::ShapeRef {
    let name = SmithyModel::local_name(target);
    if target.starts_with(traits::PRELUDE_NAMESPACE) {
        prelude.insert(name.to_string());
    }
    model::ShapeRef::new(name)
}

fn convert_member(name: &str, member: &Member, prelude: &mut BTreeSet<String>) -> MemberRef {
    let mut converted = MemberRef::new(name, shape_ref(&member.target, prelude).shape_name);
    converted.required = member.traits.contains_key(traits::REQUIRED);
    converted.documentation = documentation(&member.traits);
    converted
}

/// Shape kind of a data shape; `None` for services, operations and
/// resources
fn convert_kind(shape: &Shape, prelude: &mut BTreeSet<String>) -> Option<ShapeKind> {
    let kind = match shape {
        Shape::Service { .. } | Shape::Operation { .. } | Shape::Resource { .. } => return None,
        Shape::Structure { members, .. } => ShapeKind::Structure {
            members: members
                .iter()
                .map(|(name, member)| convert_member(name, member, prelude))
                .collect(),
        },
        Shape::List { member, .. } | Shape::Set { member, .. } => ShapeKind::List {
            member: shape_ref(&member.target, prelude),
        },
        Shape::Map { key, value, .. } => ShapeKind::Map {
            key: shape_ref(&key.target, prelude),
            value: shape_ref(&value.target, prelude),
        },
        Shape::String { .. } | Shape::Enum { .. } => ShapeKind::Scalar(ScalarType::String),
        Shape::Integer { .. } | Shape::IntEnum { .. } | Shape::Short { .. } | Shape::Byte { .. } => {
            ShapeKind::Scalar(ScalarType::Integer)
        }
        Shape::Long { .. } => ShapeKind::Scalar(ScalarType::Long),
        Shape::Float { .. } => ShapeKind::Scalar(ScalarType::Float),
        Shape::Double { .. } => ShapeKind::Scalar(ScalarType::Double),
        Shape::Boolean { .. } => ShapeKind::Scalar(ScalarType::Boolean),
        Shape::Timestamp { .. } => ShapeKind::Scalar(ScalarType::Timestamp),
        Shape::Blob { .. } => ShapeKind::Scalar(ScalarType::Blob),
        Shape::Union { .. } => ShapeKind::Unsupported("union".to_string()),
        Shape::Document { .. } => ShapeKind::Unsupported("document".to_string()),
        Shape::Other => ShapeKind::Unsupported("other".to_string()),
    };
    Some(kind)
}

/// Kind of a `smithy.api#` prelude shape by local name
fn prelude_kind(name: &str) -> Option<ShapeKind> {
    let scalar = match name {
        "String" => ScalarType::String,
        "Integer" | "PrimitiveInteger" | "Short" | "PrimitiveShort" | "Byte" | "PrimitiveByte" => {
            ScalarType::Integer
        }
        "Long" | "PrimitiveLong" => ScalarType::Long,
        "Float" | "PrimitiveFloat" => ScalarType::Float,
        "Double" | "PrimitiveDouble" => ScalarType::Double,
        "Boolean" | "PrimitiveBoolean" => ScalarType::Boolean,
        "Timestamp" => ScalarType::Timestamp,
        "Blob" => ScalarType::Blob,
        "Unit" => return None,
        other => return Some(ShapeKind::Unsupported(other.to_string())),
    };
    Some(ShapeKind::Scalar(scalar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_kinds() {
        assert_eq!(prelude_kind("PrimitiveBoolean"), Some(ShapeKind::Scalar(ScalarType::Boolean)));
        assert_eq!(prelude_kind("Unit"), None);
        assert_eq!(
            prelude_kind("Document"),
            Some(ShapeKind::Unsupported("Document".to_string()))
        );
    }

    #[test]
    fn test_unit_output_is_dropped() {
        let unit = Some(ShapeReference {
            target: traits::UNIT.to_string(),
        });
        assert!(non_unit(&unit).is_none());
        let real = Some(ShapeReference {
            target: "com.amazonaws.sns#CreateTopicResponse".to_string(),
        });
        assert_eq!(non_unit(&real).unwrap().target, "com.amazonaws.sns#CreateTopicResponse");
    }
}
