//! Resource models: the Spec/Status partition of one AWS resource

use crate::attributes::AttributeRoutes;
use crate::identifier::{is_arn_member, PrimaryIdentifier};
use crate::operations::OperationMap;
use crate::types::{Side, TypeResolver};
use crate::unwrap::unwrap_output;
use ack_generator_common::config::GeneratorConfig;
use ack_generator_common::{
    FieldType, GeneratorError, Names, Namer, OpType, Operation, Result, ServiceModel,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Go import path of Kubernetes API machinery meta types
pub const METAV1_IMPORT: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";
pub const METAV1_ALIAS: &str = "metav1";

/// The operations bound to one resource, one per role.
///
/// A missing role is a legitimate absence, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrdOps<'a> {
    pub create: Option<&'a Operation>,
    pub read_one: Option<&'a Operation>,
    pub read_many: Option<&'a Operation>,
    pub update: Option<&'a Operation>,
    pub delete: Option<&'a Operation>,
    pub get_attributes: Option<&'a Operation>,
    pub set_attributes: Option<&'a Operation>,
}

impl<'a> CrdOps<'a> {
    fn from_map(map: &OperationMap<'a>, resource: &str) -> Self {
        Self {
            create: map.get(OpType::Create, resource),
            read_one: map.get(OpType::Get, resource),
            read_many: map.get(OpType::List, resource),
            update: map.get(OpType::Update, resource),
            delete: map.get(OpType::Delete, resource),
            get_attributes: map.get(OpType::GetAttributes, resource),
            set_attributes: map.get(OpType::SetAttributes, resource),
        }
    }

    pub fn get(&self, op_type: OpType) -> Option<&'a Operation> {
        match op_type {
            OpType::Create => self.create,
            OpType::Get => self.read_one,
            OpType::List => self.read_many,
            OpType::Update => self.update,
            OpType::Delete => self.delete,
            OpType::GetAttributes => self.get_attributes,
            OpType::SetAttributes => self.set_attributes,
            OpType::CreateBatch => None,
        }
    }
}

/// Where a field's value lives on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldSource {
    /// A structure member with this wire name
    Member(String),
    /// A key of the resource's attribute map
    AttributeKey(String),
}

/// One field of a resource's Spec or Status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrdField {
    pub names: Names,
    pub field_type: FieldType,
    /// Shape the field was derived from; `None` for attribute keys
    pub shape_name: Option<String>,
    pub source: FieldSource,
}

impl CrdField {
    /// Member name or attribute key on the wire
    pub fn wire_name(&self) -> &str {
        match &self.source {
            FieldSource::Member(name) | FieldSource::AttributeKey(name) => name,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.source, FieldSource::AttributeKey(_))
    }
}

/// A resource model.
///
/// Spec and Status fields are keyed by original member name (after any
/// configured rename) and never share a key.
#[derive(Debug, Clone)]
pub struct Crd<'a> {
    pub names: Names,
    pub kind: String,
    pub plural: String,
    pub ops: CrdOps<'a>,
    pub spec_fields: BTreeMap<String, CrdField>,
    pub status_fields: BTreeMap<String, CrdField>,
    pub primary_identifier: Option<PrimaryIdentifier>,
    /// Attribute key holding the owning account ID
    pub owner_account_id: Option<String>,
    /// Import path to alias
    pub type_imports: BTreeMap<String, String>,
}

impl<'a> Crd<'a> {
    fn new(names: Names, plural: String, ops: CrdOps<'a>) -> Self {
        Self {
            kind: names.camel.clone(),
            names,
            plural,
            ops,
            spec_fields: BTreeMap::new(),
            status_fields: BTreeMap::new(),
            primary_identifier: None,
            owner_account_id: None,
            type_imports: BTreeMap::new(),
        }
    }

    /// Resource name as it appears in operation names
    pub fn resource_name(&self) -> &str {
        &self.names.original
    }

    pub fn spec_field_names(&self) -> Vec<&str> {
        self.spec_fields.keys().map(String::as_str).collect()
    }

    pub fn status_field_names(&self) -> Vec<&str> {
        self.status_fields.keys().map(String::as_str).collect()
    }

    pub fn add_spec_field(&mut self, field: CrdField) {
        self.spec_fields.insert(field.names.original.clone(), field);
    }

    /// Add a Status field, registering imports its type needs
    pub fn add_status_field(&mut self, field: CrdField) {
        if field.field_type.contains_date_time() {
            self.add_type_import(METAV1_IMPORT, METAV1_ALIAS);
        }
        self.status_fields.insert(field.names.original.clone(), field);
    }

    pub fn add_type_import(&mut self, path: &str, alias: &str) {
        self.type_imports.insert(path.to_string(), alias.to_string());
    }

    /// Whether an output member maps onto the resource ARN
    pub fn is_primary_identifier_member(&self, member_name: &str) -> bool {
        let bound = matches!(
            &self.primary_identifier,
            Some(PrimaryIdentifier::Member { member, .. }) if member == member_name
        );
        bound || is_arn_member(self.resource_name(), member_name)
    }

    fn bind_primary_identifier(&mut self, candidate: PrimaryIdentifier) {
        match &self.primary_identifier {
            None => {
                debug!(resource = %self.kind, source = candidate.source_name(), "bound primary identifier");
                self.primary_identifier = Some(candidate);
            }
            Some(bound) => debug!(
                resource = %self.kind,
                bound = bound.source_name(),
                candidate = candidate.source_name(),
                "primary identifier already bound"
            ),
        }
    }
}

/// Derives every resource model of one service
pub(crate) struct CrdBuilder<'b, 'a> {
    pub model: &'a ServiceModel,
    pub config: &'b GeneratorConfig,
    pub namer: &'b dyn Namer,
    pub op_map: &'b OperationMap<'a>,
    pub types: &'b TypeResolver<'b>,
}

impl<'b, 'a> CrdBuilder<'b, 'a> {
    /// Build one model per resource with a Create operation, sorted by
    /// camel-case name
    pub fn build(&self) -> Result<Vec<Crd<'a>>> {
        let mut crds = Vec::new();

        for resource in self.op_map.resources(OpType::Create) {
            if self.config.is_ignored_resource(resource) {
                debug!(resource, "resource ignored by configuration");
                continue;
            }
            crds.push(self.build_one(resource)?);
        }

        crds.sort_by(|a, b| a.names.camel.cmp(&b.names.camel));
        Ok(crds)
    }

    fn build_one(&self, resource: &str) -> Result<Crd<'a>> {
        let ops = CrdOps::from_map(self.op_map, resource);
        let create = ops
            .create
            .ok_or_else(|| GeneratorError::Generation(format!("{} has no Create operation", resource)))?;

        let names = self.namer.names(resource);
        let plural = self.namer.pluralize(&names.camel);
        let mut crd = Crd::new(names, plural, ops);

        let routes = self
            .config
            .attributes_map(resource)
            .map(AttributeRoutes::from_config);
        let map_member = routes.as_ref().map(|r| r.map_member);

        let input_ref = create
            .input
            .as_ref()
            .ok_or_else(|| GeneratorError::MissingInputShape {
                operation: create.name.clone(),
            })?;
        let input = self.model.resolve(input_ref, &create.name)?;

        for member in input.members() {
            let context = format!("{}.{}", input.name, member.name);
            let shape = self.model.resolve(&member.target, &context)?;
            if map_member == Some(member.name.as_str()) {
                continue;
            }
            let Some(field_type) = self.types.field_type(shape, Side::Crd)? else {
                warn!(resource, member = %member.name, shape = %shape.name, "no type mapping; field skipped");
                continue;
            };
            let key = self
                .config
                .input_rename(resource, &create.name, &member.name)
                .unwrap_or(member.name.as_str());
            crd.add_spec_field(CrdField {
                names: self.namer.names(key),
                field_type,
                shape_name: Some(shape.name.clone()),
                source: FieldSource::Member(member.name.clone()),
            });
        }

        if let Some(routes) = &routes {
            for key in &routes.spec {
                crd.add_spec_field(attribute_field(self.namer, key));
            }
        }

        if let Some(output_ref) = &create.output {
            let output = self.model.resolve(output_ref, &create.name)?;
            let unwrapped = unwrap_output(self.model, output)?;

            for member in unwrapped.shape.members() {
                let context = format!("{}.{}", unwrapped.shape.name, member.name);
                let shape = self.model.resolve(&member.target, &context)?;
                if map_member == Some(member.name.as_str()) {
                    continue;
                }
                let key = self
                    .config
                    .output_rename(resource, &create.name, &member.name)
                    .unwrap_or(member.name.as_str());
                if crd.spec_fields.contains_key(key) {
                    continue;
                }
                if is_arn_member(resource, &member.name) {
                    crd.bind_primary_identifier(PrimaryIdentifier::Member {
                        operation: create.name.clone(),
                        member: member.name.clone(),
                    });
                    continue;
                }
                let Some(field_type) = self.types.field_type(shape, Side::Crd)? else {
                    warn!(resource, member = %member.name, shape = %shape.name, "no type mapping; field skipped");
                    continue;
                };
                crd.add_status_field(CrdField {
                    names: self.namer.names(key),
                    field_type,
                    shape_name: Some(shape.name.clone()),
                    source: FieldSource::Member(member.name.clone()),
                });
            }
        }

        if let Some(routes) = &routes {
            for key in &routes.status {
                if crd.spec_fields.contains_key(*key) || crd.status_fields.contains_key(*key) {
                    warn!(resource, key, "attribute key shadows an existing field; skipped");
                    continue;
                }
                crd.add_status_field(attribute_field(self.namer, key));
            }
            if let Some(key) = routes.primary_identifier {
                crd.bind_primary_identifier(PrimaryIdentifier::AttributeKey {
                    key: key.to_string(),
                });
            }
            crd.owner_account_id = routes.owner_account_id.map(str::to_string);
        }

        debug!(
            resource = %crd.kind,
            spec = crd.spec_fields.len(),
            status = crd.status_fields.len(),
            "built resource model"
        );
        Ok(crd)
    }
}

fn attribute_field(namer: &dyn Namer, key: &str) -> CrdField {
    CrdField {
        names: namer.names(key),
        field_type: FieldType::String,
        shape_name: None,
        source: FieldSource::AttributeKey(key.to_string()),
    }
}
