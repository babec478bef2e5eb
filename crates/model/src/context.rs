//! One generation run over one service model

use crate::crd::{Crd, CrdBuilder};
use crate::operations::{NameConventionClassifier, OperationClassifier, OperationMap};
use crate::program::Program;
use crate::synth::{self, InboundTarget, Scope};
use crate::type_def::{build_type_defs, TypeDef};
use crate::types::TypeResolver;
use ack_generator_common::config::GeneratorConfig;
use ack_generator_common::{DefaultNamer, Namer, OpType, Result, ServiceModel};
use once_cell::unsync::OnceCell;
use std::collections::BTreeSet;
use tracing::debug;

/// Derived views of one service model, computed on first use and cached
/// for the lifetime of the context.
///
/// Nothing is shared between contexts: generating several services means
/// building one context per service.
pub struct SchemaContext<'a> {
    model: &'a ServiceModel,
    config: &'a GeneratorConfig,
    namer: Box<dyn Namer>,
    classifier: Box<dyn OperationClassifier>,
    op_map: OnceCell<OperationMap<'a>>,
    crds: OnceCell<Vec<Crd<'a>>>,
    type_defs: OnceCell<Vec<TypeDef>>,
}

impl<'a> SchemaContext<'a> {
    pub fn new(model: &'a ServiceModel, config: &'a GeneratorConfig) -> Self {
        Self {
            model,
            config,
            namer: Box::new(DefaultNamer),
            classifier: Box::new(NameConventionClassifier::<DefaultNamer>::default()),
            op_map: OnceCell::new(),
            crds: OnceCell::new(),
            type_defs: OnceCell::new(),
        }
    }

    /// Replace the naming utility; drops anything already derived
    pub fn with_namer(mut self, namer: impl Namer + 'static) -> Self {
        self.namer = Box::new(namer);
        self.invalidate();
        self
    }

    /// Replace the operation classifier; drops anything already derived
    pub fn with_classifier(mut self, classifier: impl OperationClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self.invalidate();
        self
    }

    fn invalidate(&mut self) {
        self.op_map = OnceCell::new();
        self.crds = OnceCell::new();
        self.type_defs = OnceCell::new();
    }

    pub fn model(&self) -> &'a ServiceModel {
        self.model
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    pub fn namer(&self) -> &dyn Namer {
        self.namer.as_ref()
    }

    pub fn operation_map(&self) -> Result<&OperationMap<'a>> {
        self.op_map.get_or_try_init(|| {
            let map = OperationMap::build(self.model, self.config, self.classifier.as_ref())?;
            debug!(service = %self.model.service_id, "indexed operations");
            Ok(map)
        })
    }

    /// Camel-case kind of every resource that will be generated
    fn kinds(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .operation_map()?
            .resources(OpType::Create)
            .filter(|r| !self.config.is_ignored_resource(r))
            .map(|r| self.namer.names(r).camel)
            .collect())
    }

    fn types_for<'k>(&self, kinds: &'k BTreeSet<String>) -> TypeResolver<'_> {
        TypeResolver::new(self.model, self.namer.as_ref(), kinds.iter().map(String::as_str))
    }

    /// Every resource model, sorted by kind
    pub fn crds(&self) -> Result<&[Crd<'a>]> {
        let crds = self.crds.get_or_try_init(|| {
            let kinds = self.kinds()?;
            let types = self.types_for(&kinds);
            let builder = CrdBuilder {
                model: self.model,
                config: self.config,
                namer: self.namer.as_ref(),
                op_map: self.operation_map()?,
                types: &types,
            };
            let crds = builder.build()?;
            debug!(service = %self.model.service_id, resources = crds.len(), "built resource models");
            Ok::<_, ack_generator_common::GeneratorError>(crds)
        })?;
        Ok(crds)
    }

    /// Look up a resource by kind or by its name in operation names
    pub fn crd(&self, name: &str) -> Result<Option<&Crd<'a>>> {
        Ok(self
            .crds()?
            .iter()
            .find(|c| c.kind == name || c.resource_name() == name))
    }

    /// Nested structure types, sorted by name
    pub fn type_defs(&self) -> Result<&[TypeDef]> {
        let defs = self.type_defs.get_or_try_init(|| {
            let kinds = self.kinds()?;
            let types = self.types_for(&kinds);
            build_type_defs(self.model, self.config, self.namer.as_ref(), &types, &kinds)
        })?;
        Ok(defs)
    }

    fn with_scope<T>(&self, f: impl FnOnce(&Scope<'_>) -> Result<T>) -> Result<T> {
        let kinds = self.kinds()?;
        let types = self.types_for(&kinds);
        let scope = Scope {
            model: self.model,
            config: self.config,
            namer: self.namer.as_ref(),
            types: &types,
        };
        f(&scope)
    }

    /// Statements filling the `op_type` request from the resource's Spec
    pub fn set_input(
        &self,
        crd: &Crd<'_>,
        op_type: OpType,
        resource_root: &str,
        request_var: &str,
    ) -> Result<Program> {
        self.with_scope(|scope| synth::set_input(scope, crd, op_type, resource_root, request_var))
    }

    /// Statements copying the `op_type` response into `target`
    pub fn set_output(
        &self,
        crd: &Crd<'_>,
        op_type: OpType,
        response_var: &str,
        target: &InboundTarget,
    ) -> Result<Program> {
        self.with_scope(|scope| synth::set_output(scope, crd, op_type, response_var, target))
    }

    pub fn get_attributes_set_input(
        &self,
        crd: &Crd<'_>,
        resource_root: &str,
        request_var: &str,
    ) -> Result<Program> {
        self.with_scope(|scope| synth::get_attributes_set_input(scope, crd, resource_root, request_var))
    }

    pub fn get_attributes_set_output(
        &self,
        crd: &Crd<'_>,
        response_var: &str,
        status_root: &str,
    ) -> Result<Program> {
        self.with_scope(|scope| synth::get_attributes_set_output(scope, crd, response_var, status_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::MockOperationClassifier;
    use ack_generator_common::{MemberRef, Operation, ScalarType, Shape};

    fn model() -> ServiceModel {
        ServiceModel::new("Widgets")
            .with_shape(Shape::scalar("String", ScalarType::String))
            .with_shape(Shape::structure("MakeWidgetRequest", vec![MemberRef::new("Name", "String")]))
            .with_shape(Shape::structure("MakeWidgetResponse", vec![MemberRef::new("WidgetId", "String")]))
            .with_operation(
                Operation::new("MakeWidget")
                    .with_input("MakeWidgetRequest")
                    .with_output("MakeWidgetResponse"),
            )
            .finish()
    }

    #[test]
    fn test_crds_are_memoized() {
        let model = model();
        let config = GeneratorConfig::default();
        let mut classifier = MockOperationClassifier::new();
        classifier
            .expect_classify()
            .times(1)
            .returning(|name| (name == "MakeWidget").then(|| (OpType::Create, "Widget".to_string())));

        let ctx = SchemaContext::new(&model, &config).with_classifier(classifier);
        let first = ctx.crds().unwrap().as_ptr();
        let second = ctx.crds().unwrap().as_ptr();
        assert_eq!(first, second);

        let widget = ctx.crd("Widget").unwrap().unwrap();
        assert_eq!(widget.spec_field_names(), vec!["Name"]);
        assert_eq!(widget.status_field_names(), vec!["WidgetId"]);
    }

    #[test]
    fn test_default_classifier_ignores_unconventional_names() {
        let model = model();
        let config = GeneratorConfig::default();
        let ctx = SchemaContext::new(&model, &config);
        assert!(ctx.crds().unwrap().is_empty());
        assert!(ctx.crd("Widget").unwrap().is_none());
    }
}
