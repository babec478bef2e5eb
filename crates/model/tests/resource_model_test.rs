//! Integration tests for resource model derivation

use ack_generator_common::{
    FieldType, GeneratorConfig, GeneratorError, MemberRef, OpType, Operation, ScalarType, ServiceModel, Shape,
};
use ack_generator_model::crd::{METAV1_ALIAS, METAV1_IMPORT};
use ack_generator_model::{unwrap_output, FieldSource, PrimaryIdentifier, SchemaContext};
use pretty_assertions::assert_eq;

/// A REST-style registry service whose create call wraps its result
fn ecr_model() -> ServiceModel {
    ServiceModel::new("ECR")
        .with_shape(Shape::scalar("String", ScalarType::String))
        .with_shape(Shape::scalar("Timestamp", ScalarType::Timestamp))
        .with_shape(Shape::structure(
            "Tag",
            vec![MemberRef::new("Key", "String"), MemberRef::new("Value", "String")],
        ))
        .with_shape(Shape::list("TagList", "Tag"))
        .with_shape(Shape::list("NameList", "String"))
        .with_shape(Shape::structure(
            "Repository",
            vec![
                MemberRef::new("Arn", "String"),
                MemberRef::new("CreatedAt", "Timestamp"),
                MemberRef::new("Name", "String"),
            ],
        ))
        .with_shape(Shape::list("RepositoryList", "Repository"))
        .with_shape(Shape::structure(
            "CreateRepositoryRequest",
            vec![MemberRef::new("Name", "String").required(), MemberRef::new("Tags", "TagList")],
        ))
        .with_shape(Shape::structure(
            "CreateRepositoryResponse",
            vec![MemberRef::new("Repository", "Repository")],
        ))
        .with_shape(Shape::structure(
            "DescribeRepositoriesRequest",
            vec![MemberRef::new("Names", "NameList")],
        ))
        .with_shape(Shape::structure(
            "DescribeRepositoriesResponse",
            vec![
                MemberRef::new("NextToken", "String"),
                MemberRef::new("Repositories", "RepositoryList"),
            ],
        ))
        .with_shape(Shape::structure("DeleteRepositoryRequest", vec![MemberRef::new("Name", "String")]))
        .with_shape(Shape::structure("RepositoryNotFoundException", vec![MemberRef::new("message", "String")]).exception())
        .with_operation(
            Operation::new("CreateRepository")
                .with_input("CreateRepositoryRequest")
                .with_output("CreateRepositoryResponse"),
        )
        .with_operation(
            Operation::new("DescribeRepositories")
                .with_input("DescribeRepositoriesRequest")
                .with_output("DescribeRepositoriesResponse"),
        )
        .with_operation(Operation::new("DeleteRepository").with_input("DeleteRepositoryRequest"))
        .finish()
}

/// A topic service configured entirely through an attribute map
fn attribute_map_model() -> ServiceModel {
    ServiceModel::new("SNS")
        .with_shape(Shape::scalar("String", ScalarType::String))
        .with_shape(Shape::map("TopicAttributesMap", "String", "String"))
        .with_shape(Shape::structure(
            "CreateTopicInput",
            vec![MemberRef::new("Attributes", "TopicAttributesMap")],
        ))
        .with_shape(Shape::structure(
            "GetTopicAttributesInput",
            vec![MemberRef::new("TopicArn", "String").required()],
        ))
        .with_shape(Shape::structure(
            "GetTopicAttributesResponse",
            vec![MemberRef::new("Attributes", "TopicAttributesMap")],
        ))
        .with_operation(Operation::new("CreateTopic").with_input("CreateTopicInput"))
        .with_operation(
            Operation::new("GetTopicAttributes")
                .with_input("GetTopicAttributesInput")
                .with_output("GetTopicAttributesResponse"),
        )
        .finish()
}

const ATTRIBUTE_MAP_CONFIG: &str = r#"
resources:
  Topic:
    unpack_attributes_map:
      fields:
        DisplayName: {}
        Owner:
          is_read_only: true
        Arn:
          is_read_only: true
          is_primary_identifier: true
"#;

#[test]
fn test_wrapped_create_output_partitions_fields() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);

    let crds = ctx.crds().unwrap();
    assert_eq!(crds.len(), 1);
    let repo = &crds[0];

    assert_eq!(repo.kind, "Repository");
    assert_eq!(repo.plural, "Repositories");
    assert_eq!(repo.spec_field_names(), vec!["Name", "Tags"]);
    assert_eq!(repo.status_field_names(), vec!["CreatedAt"]);
    assert_eq!(
        repo.primary_identifier,
        Some(PrimaryIdentifier::Member {
            operation: "CreateRepository".to_string(),
            member: "Arn".to_string(),
        })
    );

    assert_eq!(
        repo.spec_fields["Tags"].field_type,
        FieldType::List(Box::new(FieldType::Structure("Tag".to_string())))
    );
    assert_eq!(repo.status_fields["CreatedAt"].field_type, FieldType::DateTime);
    assert_eq!(repo.type_imports.get(METAV1_IMPORT).map(String::as_str), Some(METAV1_ALIAS));
}

#[test]
fn test_operations_bound_per_role() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let repo = ctx.crd("Repository").unwrap().unwrap();

    assert_eq!(repo.ops.create.unwrap().name, "CreateRepository");
    assert_eq!(repo.ops.read_many.unwrap().name, "DescribeRepositories");
    assert_eq!(repo.ops.delete.unwrap().name, "DeleteRepository");
    assert!(repo.ops.read_one.is_none());
    assert!(repo.ops.update.is_none());
    assert!(repo.ops.get(OpType::GetAttributes).is_none());
}

#[test]
fn test_unwrapping_is_idempotent() {
    let model = ecr_model();
    let output = model.shape("CreateRepositoryResponse").unwrap();

    let once = unwrap_output(&model, output).unwrap();
    assert_eq!(once.shape.name, "Repository");
    assert_eq!(once.accessor, Some("Repository"));

    let twice = unwrap_output(&model, once.shape).unwrap();
    assert_eq!(twice.shape.name, "Repository");
    assert_eq!(twice.accessor, None);
}

#[test]
fn test_attribute_map_resource() {
    let model = attribute_map_model();
    let config = GeneratorConfig::from_yaml(ATTRIBUTE_MAP_CONFIG).unwrap();
    let ctx = SchemaContext::new(&model, &config);
    let topic = ctx.crd("Topic").unwrap().unwrap();

    assert_eq!(topic.spec_field_names(), vec!["DisplayName"]);
    assert_eq!(topic.status_field_names(), vec!["Owner"]);
    assert_eq!(
        topic.primary_identifier,
        Some(PrimaryIdentifier::AttributeKey {
            key: "Arn".to_string()
        })
    );
    assert_eq!(
        topic.spec_fields["DisplayName"].source,
        FieldSource::AttributeKey("DisplayName".to_string())
    );
    assert_eq!(topic.status_fields["Owner"].field_type, FieldType::String);
    assert_eq!(topic.ops.get_attributes.unwrap().name, "GetTopicAttributes");
}

#[test]
fn test_partition_properties_hold() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);

    for crd in ctx.crds().unwrap() {
        let create = crd.ops.create.unwrap();
        let input = model.shape(&create.input.as_ref().unwrap().shape_name).unwrap();
        let primary = crd.primary_identifier.as_ref().map(|p| p.source_name());
        let output = model.shape(&create.output.as_ref().unwrap().shape_name).unwrap();
        let unwrapped = unwrap_output(&model, output).unwrap();

        for name in crd.spec_fields.keys() {
            assert!(!crd.status_fields.contains_key(name), "{name} is both Spec and Status");
            assert!(input.member(name).is_some(), "{name} is not a Create input member");
        }
        for name in crd.status_fields.keys() {
            assert!(input.member(name).is_none(), "{name} is a Create input member");
            assert_ne!(Some(name.as_str()), primary);
        }
        assert!(!crd.status_fields.is_empty());
        for field in crd.status_fields.values() {
            if let FieldSource::Member(member) = &field.source {
                assert!(
                    unwrapped.shape.member(member).is_some(),
                    "{member} is not a member of the unwrapped Create output"
                );
            }
        }
    }
}

#[test]
fn test_renamed_input_member() {
    let model = ecr_model();
    let config = GeneratorConfig::from_yaml(
        r#"
resources:
  Repository:
    renames:
      operations:
        CreateRepository:
          input_fields:
            Name: RepositoryName
          output_fields:
            Name: RepositoryName
"#,
    )
    .unwrap();
    let ctx = SchemaContext::new(&model, &config);
    let repo = ctx.crd("Repository").unwrap().unwrap();

    assert_eq!(repo.spec_field_names(), vec!["RepositoryName", "Tags"]);
    assert_eq!(repo.spec_fields["RepositoryName"].wire_name(), "Name");
    assert_eq!(repo.status_field_names(), vec!["CreatedAt"]);
}

#[test]
fn test_ignored_resource_is_not_generated() {
    let model = ecr_model();
    let config = GeneratorConfig::from_yaml("ignore:\n  resource_names: [Repository]\n").unwrap();
    let ctx = SchemaContext::new(&model, &config);
    assert!(ctx.crds().unwrap().is_empty());
}

#[test]
fn test_type_defs_cover_nested_structures_only() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);

    let defs = ctx.type_defs().unwrap();
    let names: Vec<&str> = defs.iter().map(|d| d.names.camel.as_str()).collect();
    assert_eq!(names, vec!["Tag"]);
    assert_eq!(defs[0].attrs.keys().collect::<Vec<_>>(), vec!["Key", "Value"]);
}

#[test]
fn test_create_without_input_is_fatal() {
    let model = ServiceModel::new("Broken")
        .with_operation(Operation::new("CreateWidget"))
        .finish();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);

    let err = ctx.crds().unwrap_err();
    assert!(err.is_model_integrity());
    assert!(matches!(err, GeneratorError::MissingInputShape { ref operation } if operation == "CreateWidget"));
}

#[test]
fn test_dangling_output_member_is_fatal() {
    let model = ServiceModel::new("Broken")
        .with_shape(Shape::scalar("String", ScalarType::String))
        .with_shape(Shape::structure("CreateWidgetInput", vec![MemberRef::new("Name", "String")]))
        .with_shape(Shape::structure(
            "CreateWidgetOutput",
            vec![MemberRef::new("Id", "String"), MemberRef::new("Details", "WidgetDetails")],
        ))
        .with_operation(
            Operation::new("CreateWidget")
                .with_input("CreateWidgetInput")
                .with_output("CreateWidgetOutput"),
        )
        .finish();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);

    let err = ctx.crds().unwrap_err();
    assert!(err.is_model_integrity());
    assert!(err.to_string().contains("WidgetDetails"));
}
