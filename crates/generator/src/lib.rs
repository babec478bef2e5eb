//! Go source generation for ACK service controllers
//!
//! This crate renders the resources, nested type definitions and
//! synthesized field assignment programs of a [`SchemaContext`] into the
//! Go files of a service controller:
//! - `apis/v1alpha1/<resource>.go`: Spec and Status structs
//! - `apis/v1alpha1/types.go`: nested types shared by resources
//! - `pkg/resource/<resource>/sdk.go`: request builders and response
//!   setters per operation role

mod go;
mod templates;

pub use go::{go_type, GoBlock, GoRenderer};

use ack_generator_common::{GeneratorError, Names, OpType, Result};
use ack_generator_model::crd::METAV1_IMPORT;
use ack_generator_model::{Crd, CrdField, InboundTarget, Program, SchemaContext};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info};

/// Import path of the ACK runtime's core API types
pub const ACK_CORE_IMPORT: &str = "github.com/aws-controllers-k8s/runtime/apis/core/v1alpha1";

/// Variable names the sdk.go functions bind
const RESOURCE_VAR: &str = "r.ko";
const REQUEST_VAR: &str = "res";
const RESPONSE_VAR: &str = "resp";
const OBJECT_VAR: &str = "ko";

/// Operation roles in the order their functions appear in sdk.go
const ROLES: [(OpType, &str); 7] = [
    (OpType::Create, "Create"),
    (OpType::Get, "ReadOne"),
    (OpType::List, "ReadMany"),
    (OpType::Update, "Update"),
    (OpType::Delete, "Delete"),
    (OpType::GetAttributes, "GetAttributes"),
    (OpType::SetAttributes, "SetAttributes"),
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
struct GoImport {
    alias: Option<String>,
    path: String,
}

impl GoImport {
    fn new(alias: Option<&str>, path: impl Into<String>) -> Self {
        Self {
            alias: alias.map(str::to_string),
            path: path.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResourceView<'r> {
    kind: &'r str,
    plural: &'r str,
    names: &'r Names,
    spec_fields: Vec<&'r CrdField>,
    status_fields: Vec<&'r CrdField>,
    imports: Vec<GoImport>,
}

impl<'r> ResourceView<'r> {
    fn new(crd: &'r Crd<'_>) -> Self {
        let mut imports: BTreeMap<String, String> = crd
            .type_imports
            .iter()
            .map(|(path, alias)| (alias.clone(), path.clone()))
            .collect();
        imports.insert(go::ACK_CORE_ALIAS.to_string(), ACK_CORE_IMPORT.to_string());
        imports.insert(go::METAV1_ALIAS.to_string(), METAV1_IMPORT.to_string());

        Self {
            kind: &crd.kind,
            plural: &crd.plural,
            names: &crd.names,
            spec_fields: crd.spec_fields.values().collect(),
            status_fields: crd.status_fields.values().collect(),
            imports: imports
                .into_iter()
                .map(|(alias, path)| GoImport::new(Some(&alias), path))
                .collect(),
        }
    }
}

/// One function of a resource's sdk.go
#[derive(Debug, Serialize)]
struct SdkFunction {
    role: &'static str,
    operation: String,
    /// "request" or "output"
    kind: &'static str,
    /// SDK input or output shape
    shape: String,
    body: String,
}

/// CRD generator
///
/// Renders every resource of one service to Go source.
pub struct CrdGenerator<'c, 'a> {
    context: &'c SchemaContext<'a>,
    tera: Tera,
}

impl<'c, 'a> CrdGenerator<'c, 'a> {
    pub fn new(context: &'c SchemaContext<'a>) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { context, tera })
    }

    /// Generate all files to a directory, returning the paths written
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let apis_dir = output_dir.join("apis").join("v1alpha1");
        fs::create_dir_all(&apis_dir).map_err(|e| {
            GeneratorError::Generation(format!("Failed to create apis directory: {}", e))
        })?;

        let mut written = Vec::new();
        for crd in self.context.crds()? {
            let path = apis_dir.join(format!("{}.go", crd.names.snake));
            write_file(&path, &self.render_resource(crd)?)?;
            written.push(path);

            let resource_dir = output_dir.join("pkg").join("resource").join(&crd.names.snake);
            fs::create_dir_all(&resource_dir).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create resource directory for {}: {}",
                    crd.kind, e
                ))
            })?;
            let path = resource_dir.join("sdk.go");
            write_file(&path, &self.render_sdk(crd)?)?;
            written.push(path);
        }

        let path = apis_dir.join("types.go");
        write_file(&path, &self.render_types()?)?;
        written.push(path);

        Ok(written)
    }

    /// Render the Spec and Status structs of one resource
    pub fn render_resource(&self, crd: &Crd<'_>) -> Result<String> {
        let mut context = self.create_context();
        context.insert("resource", &ResourceView::new(crd));
        self.render("resource.go", &context)
    }

    /// Render every nested type definition
    pub fn render_types(&self) -> Result<String> {
        let type_defs = self.context.type_defs()?;
        let mut context = self.create_context();
        context.insert("type_defs", type_defs);
        context.insert("uses_metav1", &type_defs.iter().any(|t| t.has_date_time()));
        self.render("types.go", &context)
    }

    /// Render the request builders and response setters of one resource
    pub fn render_sdk(&self, crd: &Crd<'_>) -> Result<String> {
        let mut functions = Vec::new();
        let mut aliases = BTreeSet::new();
        let mut push = |role, operation: &str, kind, shape: &str, program: Program| {
            let block = GoRenderer::render(&program, 1);
            aliases.extend(block.imports);
            functions.push(SdkFunction {
                role,
                operation: operation.to_string(),
                kind,
                shape: shape.to_string(),
                body: block.code,
            });
        };

        for (op_type, role) in ROLES {
            let Some(op) = crd.ops.get(op_type) else {
                continue;
            };
            if let Some(input) = &op.input {
                let program = match op_type {
                    OpType::GetAttributes => {
                        self.context
                            .get_attributes_set_input(crd, RESOURCE_VAR, REQUEST_VAR)?
                    }
                    _ => self.context.set_input(crd, op_type, RESOURCE_VAR, REQUEST_VAR)?,
                };
                push(role, &op.name, "request", &input.shape_name, program);
            }

            let Some(output) = &op.output else {
                continue;
            };
            let status = format!("{}.Status", OBJECT_VAR);
            let program = match op_type {
                OpType::Delete | OpType::SetAttributes => continue,
                OpType::GetAttributes => {
                    self.context
                        .get_attributes_set_output(crd, RESPONSE_VAR, &status)?
                }
                OpType::List => {
                    let target = InboundTarget::Resource(OBJECT_VAR.to_string());
                    self.context.set_output(crd, op_type, RESPONSE_VAR, &target)?
                }
                _ => {
                    let target = InboundTarget::Status(status);
                    self.context.set_output(crd, op_type, RESPONSE_VAR, &target)?
                }
            };
            push(role, &op.name, "output", &output.shape_name, program);
        }
        debug!(resource = %crd.kind, functions = functions.len(), "rendering sdk.go");

        let mut imports = Vec::new();
        if functions.iter().any(|f| f.kind == "request") {
            imports.push(GoImport::new(None, "context"));
        }
        if aliases.contains(go::TIME_PACKAGE) {
            imports.push(GoImport::new(None, go::TIME_PACKAGE));
        }
        let mut aliased = vec![
            GoImport::new(Some(go::API_TYPES_ALIAS), self.api_types_import()),
            GoImport::new(Some(go::SDK_ALIAS), self.sdk_import()),
        ];
        if aliases.contains(go::ACK_CORE_ALIAS) {
            aliased.push(GoImport::new(Some(go::ACK_CORE_ALIAS), ACK_CORE_IMPORT));
        }
        if aliases.contains(go::METAV1_ALIAS) {
            aliased.push(GoImport::new(Some(go::METAV1_ALIAS), METAV1_IMPORT));
        }
        aliased.sort();
        imports.extend(aliased);

        let mut context = self.create_context();
        context.insert("resource", &ResourceView::new(crd));
        context.insert("functions", &functions);
        context.insert("imports", &imports);
        self.render("sdk.go", &context)
    }

    fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| GeneratorError::Generation(format!("Template error in {}: {:?}", template, e)))
    }

    fn sdk_import(&self) -> String {
        format!("github.com/aws/aws-sdk-go/service/{}", self.context.model().package_name)
    }

    fn api_types_import(&self) -> String {
        format!(
            "github.com/aws-controllers-k8s/{}-controller/apis/v1alpha1",
            self.context.model().package_name
        )
    }

    /// Create template context from the service model
    fn create_context(&self) -> tera::Context {
        let model = self.context.model();
        let mut context = tera::Context::new();
        context.insert("service_id", &model.service_id);
        context.insert("package_name", &model.package_name);
        context.insert("api_version", &model.api_version);
        context
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| {
        GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), "wrote file");
    Ok(())
}

/// Generate all files for a service (convenience function)
pub fn generate_crds(context: &SchemaContext<'_>, output_path: &str) -> Result<Vec<PathBuf>> {
    let generator = CrdGenerator::new(context)?;
    generator.generate_to_directory(Path::new(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ack_generator_common::{GeneratorConfig, ServiceModel};

    #[test]
    fn test_generator_creation() {
        let model = ServiceModel::new("s3").finish();
        let config = GeneratorConfig::default();
        let context = SchemaContext::new(&model, &config);

        assert!(CrdGenerator::new(&context).is_ok());
    }

    #[test]
    fn test_import_order() {
        let mut imports = vec![
            GoImport::new(Some("svcsdk"), "github.com/aws/aws-sdk-go/service/s3"),
            GoImport::new(Some("ackv1alpha1"), ACK_CORE_IMPORT),
        ];
        imports.sort();
        assert_eq!(imports[0].alias.as_deref(), Some("ackv1alpha1"));
    }
}
