//! Integration tests for Go source generation

use ack_generator_common::{
    GeneratorConfig, MemberRef, OpType, Operation, ScalarType, ServiceModel, Shape,
};
use ack_generator_generator::{CrdGenerator, GoRenderer};
use ack_generator_model::SchemaContext;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn ecr_model() -> ServiceModel {
    ServiceModel::new("ECR")
        .with_shape(Shape::scalar("String", ScalarType::String))
        .with_shape(Shape::scalar("Timestamp", ScalarType::Timestamp))
        .with_shape(Shape::structure(
            "Tag",
            vec![MemberRef::new("Key", "String"), MemberRef::new("Value", "String")],
        ))
        .with_shape(Shape::list("TagList", "Tag"))
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
            vec![MemberRef::new("Name", "String"), MemberRef::new("Tags", "TagList")],
        ))
        .with_shape(Shape::structure(
            "CreateRepositoryResponse",
            vec![MemberRef::new("Repository", "Repository")],
        ))
        .with_shape(Shape::structure(
            "DescribeRepositoriesRequest",
            vec![MemberRef::new("Name", "String")],
        ))
        .with_shape(Shape::structure(
            "DescribeRepositoriesResponse",
            vec![
                MemberRef::new("NextToken", "String"),
                MemberRef::new("Repositories", "RepositoryList"),
            ],
        ))
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
        .finish()
}

fn sqs_model() -> ServiceModel {
    ServiceModel::new("SQS")
        .with_shape(Shape::scalar("String", ScalarType::String))
        .with_shape(Shape::map("QueueAttributeMap", "String", "String"))
        .with_shape(Shape::structure(
            "CreateQueueRequest",
            vec![
                MemberRef::new("Attributes", "QueueAttributeMap"),
                MemberRef::new("QueueName", "String").required(),
            ],
        ))
        .with_shape(Shape::structure(
            "CreateQueueResult",
            vec![MemberRef::new("QueueUrl", "String")],
        ))
        .with_shape(Shape::structure(
            "GetQueueAttributesRequest",
            vec![MemberRef::new("QueueUrl", "String").required()],
        ))
        .with_shape(Shape::structure(
            "GetQueueAttributesResult",
            vec![MemberRef::new("Attributes", "QueueAttributeMap")],
        ))
        .with_operation(
            Operation::new("CreateQueue")
                .with_input("CreateQueueRequest")
                .with_output("CreateQueueResult"),
        )
        .with_operation(
            Operation::new("GetQueueAttributes")
                .with_input("GetQueueAttributesRequest")
                .with_output("GetQueueAttributesResult"),
        )
        .finish()
}

const SQS_CONFIG: &str = r#"
resources:
  Queue:
    unpack_attributes_map:
      fields:
        Policy: {}
        QueueArn:
          is_read_only: true
          is_primary_identifier: true
"#;

#[test]
fn test_render_outbound_create() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let repo = ctx.crd("Repository").unwrap().unwrap();

    let program = ctx.set_input(repo, OpType::Create, "r.ko", "res").unwrap();
    let block = GoRenderer::render(&program, 1);
    let expected = "\tif r.ko.Spec.Name != nil {
\t\tres.SetName(*r.ko.Spec.Name)
\t}
\tif r.ko.Spec.Tags != nil {
\t\tf0 := []*svcsdk.Tag{}
\t\tfor _, f0iter := range r.ko.Spec.Tags {
\t\t\tf0elem := &svcsdk.Tag{}
\t\t\tif f0iter.Key != nil {
\t\t\t\tf0elem.SetKey(*f0iter.Key)
\t\t\t}
\t\t\tif f0iter.Value != nil {
\t\t\t\tf0elem.SetValue(*f0iter.Value)
\t\t\t}
\t\t\tf0 = append(f0, f0elem)
\t\t}
\t\tres.SetTags(f0)
\t}
";
    assert_eq!(block.code, expected);
    assert!(block.imports.is_empty());
}

#[test]
fn test_render_resource_structs() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let repo = ctx.crd("Repository").unwrap().unwrap();
    let generator = CrdGenerator::new(&ctx).unwrap();

    let rendered = generator.render_resource(repo).unwrap();
    assert!(rendered.contains("type RepositorySpec struct {\n\tName *string `json:\"name,omitempty\"`\n\tTags []*Tag `json:\"tags,omitempty\"`\n}"));
    assert!(rendered.contains("\tCreatedAt *metav1.Time `json:\"createdAt,omitempty\"`\n}"));
    assert!(rendered.contains("\tACKResourceMetadata *ackv1alpha1.ResourceMetadata `json:\"ackResourceMetadata\"`"));
    assert!(rendered.contains("\tmetav1 \"k8s.io/apimachinery/pkg/apis/meta/v1\""));
    assert!(rendered.contains("type RepositoryList struct {"));
    // The ARN lives in the resource metadata, not in Status
    assert!(!rendered.contains("\tArn *string"));
}

#[test]
fn test_render_types() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let generator = CrdGenerator::new(&ctx).unwrap();

    let rendered = generator.render_types().unwrap();
    assert!(rendered.contains(
        "type Tag struct {\n\tKey *string `json:\"key,omitempty\"`\n\tValue *string `json:\"value,omitempty\"`\n}"
    ));
    assert!(!rendered.contains("metav1"));
    assert!(!rendered.contains("type Repository struct"));
}

#[test]
fn test_render_sdk_functions() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let repo = ctx.crd("Repository").unwrap().unwrap();
    let generator = CrdGenerator::new(&ctx).unwrap();

    let rendered = generator.render_sdk(repo).unwrap();
    assert!(rendered.starts_with("// Code generated by ack-generate. DO NOT EDIT.\n\npackage repository\n"));
    assert!(rendered.contains("\t\"context\"\n"));
    assert!(rendered.contains("\tsvcsdk \"github.com/aws/aws-sdk-go/service/ecr\"\n"));
    assert!(rendered.contains("\tsvcapitypes \"github.com/aws-controllers-k8s/ecr-controller/apis/v1alpha1\"\n"));
    assert!(rendered.contains("\tackv1alpha1 \"github.com/aws-controllers-k8s/runtime/apis/core/v1alpha1\"\n"));
    assert!(rendered.contains("func (rm *resourceManager) newCreateRequestPayload("));
    assert!(rendered.contains(") (*svcsdk.CreateRepositoryRequest, error) {\n\tres := &svcsdk.CreateRepositoryRequest{}\n"));
    assert!(rendered.contains("func (rm *resourceManager) setCreateOutput(\n\tko *svcapitypes.Repository,\n\tresp *svcsdk.CreateRepositoryResponse,\n) {\n"));
    assert!(rendered.contains("\t\tko.Status.CreatedAt = &metav1.Time{Time: *resp.Repository.CreatedAt}\n"));
    assert!(rendered.contains("func (rm *resourceManager) newReadManyRequestPayload("));
    assert!(rendered.contains("\tif len(resp.Repositories) == 1 {\n\t\telem := resp.Repositories[0]\n"));
    assert!(rendered.contains("\t\t\tko.Spec.Name = elem.Name\n"));
    assert!(!rendered.contains("newUpdateRequestPayload"));
}

#[test]
fn test_render_attribute_map_sdk() {
    let model = sqs_model();
    let config = GeneratorConfig::from_yaml(SQS_CONFIG).unwrap();
    let ctx = SchemaContext::new(&model, &config);
    let queue = ctx.crd("Queue").unwrap().unwrap();
    let generator = CrdGenerator::new(&ctx).unwrap();

    let rendered = generator.render_sdk(queue).unwrap();
    assert!(rendered.contains("\tattrMap := map[string]*string{}\n"));
    assert!(rendered.contains("\t\tattrMap[\"Policy\"] = r.ko.Spec.Policy\n"));
    assert!(rendered.contains("\tres.SetAttributes(attrMap)\n"));
    assert!(rendered.contains("func (rm *resourceManager) setGetAttributesOutput("));
    assert!(rendered.contains("ackv1alpha1.AWSResourceName(*resp.Attributes[\"QueueArn\"])"));
}

#[test]
fn test_generate_to_directory() {
    let model = ecr_model();
    let config = GeneratorConfig::default();
    let ctx = SchemaContext::new(&model, &config);
    let generator = CrdGenerator::new(&ctx).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let written = generator.generate_to_directory(temp_dir.path()).unwrap();

    let relative: Vec<String> = written
        .iter()
        .map(|p| {
            p.strip_prefix(temp_dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(
        relative,
        vec![
            "apis/v1alpha1/repository.go",
            "pkg/resource/repository/sdk.go",
            "apis/v1alpha1/types.go",
        ]
    );
    for path in &written {
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("// Code generated by ack-generate. DO NOT EDIT."));
    }
}
