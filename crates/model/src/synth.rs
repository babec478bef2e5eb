//! Field assignment synthesis
//!
//! Walks structure, list and map shapes recursively and emits the
//! statements that copy a resource's fields into an SDK request
//! (outbound) or an SDK response into a resource (inbound). Every
//! assignment is guarded on the presence of its source.

use crate::attributes::AttributeRoutes;
use crate::crd::{Crd, CrdField, FieldSource};
use crate::identifier::{METADATA_ARN, METADATA_FIELD, METADATA_OWNER_ACCOUNT_ID};
use crate::program::{Accessor, AssignKind, Direction, Program, Statement};
use crate::types::{Side, TypeResolver};
use crate::unwrap::unwrap_output;
use ack_generator_common::config::GeneratorConfig;
use ack_generator_common::{
    FieldType, GeneratorError, Namer, OpType, Operation, Result, ServiceModel, Shape, ShapeKind,
};
use tracing::{debug, trace};

/// Temporary holding the attribute map of a request
pub const ATTR_MAP_VAR: &str = "attrMap";
/// Temporary holding the sole element of a ReadMany response
pub const SINGLE_ELEMENT_VAR: &str = "elem";

/// Where inbound synthesis writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundTarget {
    /// A Status struct (e.g. `ko.Status`); only Status fields are written
    Status(String),
    /// A whole resource (e.g. `ko`); Status fields go to `.Status` and
    /// Spec fields to `.Spec`, for adopting existing resources
    Resource(String),
}

impl InboundTarget {
    fn status_root(&self) -> Accessor {
        match self {
            InboundTarget::Status(root) => Accessor::parse(root),
            InboundTarget::Resource(root) => Accessor::parse(root).field("Status"),
        }
    }

    fn spec_root(&self) -> Option<Accessor> {
        match self {
            InboundTarget::Status(_) => None,
            InboundTarget::Resource(root) => Some(Accessor::parse(root).field("Spec")),
        }
    }
}

/// Everything synthesis reads besides the resource itself
pub(crate) struct Scope<'s> {
    pub model: &'s ServiceModel,
    pub config: &'s GeneratorConfig,
    pub namer: &'s dyn Namer,
    pub types: &'s TypeResolver<'s>,
}

/// Recursive shape walker for one top-level synthesis call
struct Synthesizer<'s> {
    scope: &'s Scope<'s>,
    direction: Direction,
    /// Next temporary number
    counter: usize,
    /// Structure shapes on the current walk, outermost first
    path: Vec<String>,
}

impl<'s> Synthesizer<'s> {
    fn new(scope: &'s Scope<'s>, direction: Direction, root_shape: &str) -> Self {
        Self {
            scope,
            direction,
            counter: 0,
            path: vec![root_shape.to_string()],
        }
    }

    fn side(&self) -> Side {
        match self.direction {
            Direction::Outbound => Side::Sdk,
            Direction::Inbound => Side::Crd,
        }
    }

    fn fresh(&mut self) -> String {
        let name = format!("f{}", self.counter);
        self.counter += 1;
        name
    }

    /// Source and destination names of a nested member.
    ///
    /// Resource types use camel-case field names and SDK types use the wire
    /// name.
    fn member_names(&self, wire: &str) -> (String, String) {
        let camel = self.scope.namer.names(wire).camel;
        match self.direction {
            Direction::Outbound => (camel, wire.to_string()),
            Direction::Inbound => (wire.to_string(), camel),
        }
    }

    fn enter(&mut self, shape: &Shape) -> Result<()> {
        if self.path.iter().any(|s| s == &shape.name) {
            let mut path = self.path.clone();
            path.push(shape.name.clone());
            return Err(GeneratorError::ShapeCycle { path });
        }
        self.path.push(shape.name.clone());
        Ok(())
    }

    /// Copy the value at `source` into `dest` when it is present
    fn member(&mut self, dest: Accessor, source: Accessor, shape: &Shape) -> Result<Vec<Statement>> {
        if self.scope.types.field_type(shape, self.side())?.is_none() {
            trace!(shape = %shape.name, dest = %dest, "no type mapping; skipped");
            return Ok(Vec::new());
        }

        let body = match &shape.kind {
            ShapeKind::Scalar(scalar) => vec![Statement::Assign {
                dest,
                source: source.clone(),
                kind: AssignKind::Scalar(*scalar),
            }],
            _ => {
                let var = self.fresh();
                let mut body = self.bind(&var, &source, shape)?;
                body.push(Statement::Assign {
                    dest,
                    source: Accessor::var(&var),
                    kind: AssignKind::Value,
                });
                body
            }
        };

        Ok(vec![Statement::IfPresent { source, body }])
    }

    /// Bind `var` to a converted copy of the value at `source`
    fn bind(&mut self, var: &str, source: &Accessor, shape: &Shape) -> Result<Vec<Statement>> {
        let model = self.scope.model;
        match &shape.kind {
            ShapeKind::Scalar(scalar) => Ok(vec![Statement::Let {
                var: var.to_string(),
                source: source.clone(),
                scalar: *scalar,
            }]),
            ShapeKind::Structure { members } => {
                self.enter(shape)?;
                let mut out = vec![Statement::NewStruct {
                    var: var.to_string(),
                    type_name: self.scope.types.type_name(shape, self.side()),
                }];
                for member in members {
                    let Some(member_shape) = model.shape(&member.target.shape_name) else {
                        trace!(shape = %shape.name, member = %member.name, "member shape missing; skipped");
                        continue;
                    };
                    let (src, dst) = self.member_names(&member.name);
                    out.extend(self.member(Accessor::var(var).field(dst), source.field(src), member_shape)?);
                }
                self.path.pop();
                Ok(out)
            }
            ShapeKind::List { member } => {
                let elem_shape = model.resolve(member, &format!("{}.member", shape.name))?;
                let Some(elem_type) = self.scope.types.field_type(elem_shape, self.side())? else {
                    return Ok(Vec::new());
                };
                let iter = format!("{}iter", var);
                let elem = format!("{}elem", var);

                let mut body = self.bind(&elem, &Accessor::var(&iter), elem_shape)?;
                body.push(Statement::Append {
                    list: var.to_string(),
                    value: elem,
                });
                Ok(vec![
                    Statement::NewList {
                        var: var.to_string(),
                        elem: elem_type,
                    },
                    Statement::ForEachElement {
                        source: source.clone(),
                        iter,
                        body,
                    },
                ])
            }
            ShapeKind::Map { value, .. } => {
                let value_shape = model.resolve(value, &format!("{}.value", shape.name))?;
                let Some(value_type) = self.scope.types.field_type(value_shape, self.side())? else {
                    return Ok(Vec::new());
                };
                let key = format!("{}key", var);
                let value_iter = format!("{}valit", var);
                let value_var = format!("{}val", var);

                let mut body = self.bind(&value_var, &Accessor::var(&value_iter), value_shape)?;
                body.push(Statement::Insert {
                    map: var.to_string(),
                    key: key.clone(),
                    value: value_var,
                });
                Ok(vec![
                    Statement::NewMap {
                        var: var.to_string(),
                        value: value_type,
                    },
                    Statement::ForEachEntry {
                        source: source.clone(),
                        key,
                        value: value_iter,
                        body,
                    },
                ])
            }
            ShapeKind::Unsupported(_) => Ok(Vec::new()),
        }
    }
}

fn arn_slot(status_root: &Accessor) -> Accessor {
    status_root.field(METADATA_FIELD).field(METADATA_ARN)
}

fn guarded(source: Accessor, dest: Accessor, kind: AssignKind) -> Statement {
    Statement::IfPresent {
        source: source.clone(),
        body: vec![Statement::Assign { dest, source, kind }],
    }
}

fn operation_input<'m>(scope: &Scope<'m>, op: &Operation) -> Result<Option<&'m Shape>> {
    op.input
        .as_ref()
        .map(|r| scope.model.resolve(r, &op.name))
        .transpose()
}

fn operation_output<'m>(scope: &Scope<'m>, op: &Operation) -> Result<Option<&'m Shape>> {
    op.output
        .as_ref()
        .map(|r| scope.model.resolve(r, &op.name))
        .transpose()
}

/// Statements filling the `op_type` request of `crd` from its Spec.
///
/// Spec fields are visited in sorted order. Fields with no counterpart in
/// the request shape are skipped.
pub(crate) fn set_input(
    scope: &Scope<'_>,
    crd: &Crd<'_>,
    op_type: OpType,
    resource_var: &str,
    request_var: &str,
) -> Result<Program> {
    let empty = Program::empty(Direction::Outbound);
    let Some(op) = crd.ops.get(op_type) else {
        return Ok(empty);
    };
    let Some(input) = operation_input(scope, op)? else {
        return Ok(empty);
    };

    let resource = crd.resource_name();
    let spec_root = Accessor::parse(resource_var).field("Spec");
    let request = Accessor::parse(request_var);
    let mut synth = Synthesizer::new(scope, Direction::Outbound, &input.name);
    let mut statements = Vec::new();

    let routes = scope.config.attributes_map(resource).map(AttributeRoutes::from_config);
    let map_member = routes
        .as_ref()
        .and_then(|r| input.member(r.map_member))
        .map(|m| m.name.as_str());

    if let Some(map_member) = map_member {
        statements.push(Statement::NewMap {
            var: ATTR_MAP_VAR.to_string(),
            value: FieldType::String,
        });
        for field in crd.spec_fields.values() {
            if let FieldSource::AttributeKey(key) = &field.source {
                let source = spec_root.field(&field.names.camel);
                let dest = Accessor::var(ATTR_MAP_VAR).key(key);
                statements.push(guarded(source, dest, AssignKind::Value));
            }
        }
        statements.push(Statement::Assign {
            dest: request.field(map_member),
            source: Accessor::var(ATTR_MAP_VAR),
            kind: AssignKind::Value,
        });
    }

    for (key, field) in &crd.spec_fields {
        if field.is_attribute() {
            continue;
        }
        let member = input.members().iter().find(|m| {
            Some(m.name.as_str()) != map_member
                && scope
                    .config
                    .input_rename(resource, &op.name, &m.name)
                    .unwrap_or(m.name.as_str())
                    == key.as_str()
        });
        let Some(member) = member else {
            continue;
        };
        let Some(shape) = scope.model.shape(&member.target.shape_name) else {
            continue;
        };
        statements.extend(synth.member(
            request.field(&member.name),
            spec_root.field(&field.names.camel),
            shape,
        )?);
    }

    trace!(resource, %op_type, statements = statements.len(), "synthesized outbound program");
    Ok(Program {
        direction: Direction::Outbound,
        statements,
    })
}

/// Statements copying the `op_type` response of `crd` into `target`.
///
/// Output members are visited in declared order. A ReadMany response that
/// carries a list of resources is destructured only when the list holds
/// exactly one element. When several lists could hold the resource and
/// none is recognisable, nothing is copied.
pub(crate) fn set_output(
    scope: &Scope<'_>,
    crd: &Crd<'_>,
    op_type: OpType,
    response_var: &str,
    target: &InboundTarget,
) -> Result<Program> {
    let empty = Program::empty(Direction::Inbound);
    let Some(op) = crd.ops.get(op_type) else {
        return Ok(empty);
    };
    let Some(output) = operation_output(scope, op)? else {
        return Ok(empty);
    };

    let response = Accessor::parse(response_var);
    let mut synth = Synthesizer::new(scope, Direction::Inbound, &output.name);

    if op_type == OpType::List {
        let list = match resource_list(scope, crd, output)? {
            ResourceList::Found(member, elem_shape) => Some((member, elem_shape)),
            ResourceList::Ambiguous(candidates) => {
                debug!(
                    resource = crd.resource_name(),
                    ?candidates,
                    "no list member holds the resource; ReadMany output skipped"
                );
                return Ok(empty);
            }
            ResourceList::Absent => None,
        };
        if let Some((list_member, elem_shape)) = list {
            synth.enter(elem_shape)?;
            let body = inbound_members(
                &mut synth,
                crd,
                op,
                &Accessor::var(SINGLE_ELEMENT_VAR),
                elem_shape,
                target,
            )?;
            return Ok(Program {
                direction: Direction::Inbound,
                statements: vec![Statement::IfSingleElement {
                    source: response.field(list_member),
                    elem: SINGLE_ELEMENT_VAR.to_string(),
                    body,
                }],
            });
        }
    }

    let unwrapped = unwrap_output(scope.model, output)?;
    let source_root = match unwrapped.accessor {
        Some(accessor) => {
            synth.enter(unwrapped.shape)?;
            response.field(accessor)
        }
        None => response,
    };
    let statements = inbound_members(&mut synth, crd, op, &source_root, unwrapped.shape, target)?;

    trace!(resource = crd.resource_name(), %op_type, statements = statements.len(), "synthesized inbound program");
    Ok(Program {
        direction: Direction::Inbound,
        statements,
    })
}

/// Output member of a ReadMany response holding the listed resources
enum ResourceList<'m> {
    Found(&'m str, &'m Shape),
    /// Several lists of structures, none recognisably the resource
    Ambiguous(Vec<&'m str>),
    Absent,
}

/// Pick the list of structures in `output` that holds `crd`'s resources.
///
/// A list whose element is the shape Create returns wins, then a list named
/// after the resource. A sole candidate is taken as is.
fn resource_list<'m>(scope: &Scope<'m>, crd: &Crd<'_>, output: &'m Shape) -> Result<ResourceList<'m>> {
    let mut candidates = Vec::new();
    for member in output.members() {
        let Some(shape) = scope.model.shape(&member.target.shape_name) else {
            continue;
        };
        if let ShapeKind::List { member: elem } = &shape.kind {
            let elem_shape = scope.model.resolve(elem, &format!("{}.member", shape.name))?;
            if elem_shape.is_structure() {
                candidates.push((member.name.as_str(), elem_shape));
            }
        }
    }

    if let &[(member, elem_shape)] = candidates.as_slice() {
        return Ok(ResourceList::Found(member, elem_shape));
    }
    if candidates.is_empty() {
        return Ok(ResourceList::Absent);
    }

    let created = match crd.ops.create {
        Some(create) => match operation_output(scope, create)? {
            Some(shape) => Some(unwrap_output(scope.model, shape)?.shape.name.as_str()),
            None => None,
        },
        None => None,
    };
    if let Some(created) = created {
        if let Some(&(member, elem_shape)) = candidates.iter().find(|(_, elem)| elem.name == created) {
            return Ok(ResourceList::Found(member, elem_shape));
        }
    }

    let resource = crd.resource_name();
    let named = |name: &str| name.eq_ignore_ascii_case(&crd.plural) || name.eq_ignore_ascii_case(resource);
    if let Some(&(member, elem_shape)) = candidates.iter().find(|(member, _)| named(*member)) {
        return Ok(ResourceList::Found(member, elem_shape));
    }

    Ok(ResourceList::Ambiguous(candidates.into_iter().map(|(member, _)| member).collect()))
}

fn inbound_members(
    synth: &mut Synthesizer<'_>,
    crd: &Crd<'_>,
    op: &Operation,
    source_root: &Accessor,
    shape: &Shape,
    target: &InboundTarget,
) -> Result<Vec<Statement>> {
    let scope = synth.scope;
    let resource = crd.resource_name();
    let status_root = target.status_root();
    let spec_root = target.spec_root();
    let map_member = scope
        .config
        .attributes_map(resource)
        .map(|a| a.map_member.as_str());

    let mut statements = Vec::new();
    for member in shape.members() {
        let Some(member_shape) = scope.model.shape(&member.target.shape_name) else {
            continue;
        };
        if map_member == Some(member.name.as_str()) {
            continue;
        }
        let source = source_root.field(&member.name);
        let key = scope
            .config
            .output_rename(resource, &op.name, &member.name)
            .unwrap_or(member.name.as_str());

        let dest = match (crd.status_fields.get(key), crd.spec_fields.get(key), &spec_root) {
            (Some(field), _, _) => Some(status_root.field(&field.names.camel)),
            (None, Some(field), Some(spec_root)) => Some(spec_root.field(&field.names.camel)),
            _ => None,
        };

        match dest {
            Some(dest) => statements.extend(synth.member(dest, source, member_shape)?),
            None if !crd.spec_fields.contains_key(key) && crd.is_primary_identifier_member(&member.name) => {
                statements.push(guarded(source, arn_slot(&status_root), AssignKind::ResourceArn));
            }
            None => {}
        }
    }
    Ok(statements)
}

/// Statements filling the GetAttributes request of `crd`.
///
/// The ARN member comes from the resource metadata; other members come
/// from the Status or Spec field with the same wire name.
pub(crate) fn get_attributes_set_input(
    scope: &Scope<'_>,
    crd: &Crd<'_>,
    resource_var: &str,
    request_var: &str,
) -> Result<Program> {
    let empty = Program::empty(Direction::Outbound);
    let Some(op) = crd.ops.get_attributes else {
        return Ok(empty);
    };
    let Some(input) = operation_input(scope, op)? else {
        return Ok(empty);
    };

    let resource_root = Accessor::parse(resource_var);
    let status_root = resource_root.field("Status");
    let spec_root = resource_root.field("Spec");
    let request = Accessor::parse(request_var);
    let primary = crd.primary_identifier.as_ref().map(|p| p.source_name());
    let mut synth = Synthesizer::new(scope, Direction::Outbound, &input.name);
    let mut statements = Vec::new();

    for member in input.members() {
        let Some(shape) = scope.model.shape(&member.target.shape_name) else {
            continue;
        };
        let dest = request.field(&member.name);

        if primary == Some(member.name.as_str()) || crd.is_primary_identifier_member(&member.name) {
            statements.push(guarded(arn_slot(&status_root), dest, AssignKind::ResourceArn));
            continue;
        }

        let by_wire_name = |field: &&CrdField| !field.is_attribute() && field.wire_name() == member.name;
        let source = if let Some(field) = crd.status_fields.values().find(by_wire_name) {
            status_root.field(&field.names.camel)
        } else if let Some(field) = crd.spec_fields.values().find(by_wire_name) {
            spec_root.field(&field.names.camel)
        } else {
            continue;
        };
        statements.extend(synth.member(dest, source, shape)?);
    }

    Ok(Program {
        direction: Direction::Outbound,
        statements,
    })
}

/// Statements unpacking the GetAttributes response of `crd` into its
/// Status: read-only attribute fields, then the owner account ID, then the
/// ARN.
pub(crate) fn get_attributes_set_output(
    scope: &Scope<'_>,
    crd: &Crd<'_>,
    response_var: &str,
    status_root: &str,
) -> Result<Program> {
    let target = InboundTarget::Status(status_root.to_string());
    let Some(attrs) = scope.config.attributes_map(crd.resource_name()) else {
        return set_output(scope, crd, OpType::GetAttributes, response_var, &target);
    };

    let empty = Program::empty(Direction::Inbound);
    let Some(op) = crd.ops.get_attributes else {
        return Ok(empty);
    };
    let Some(output) = operation_output(scope, op)? else {
        return Ok(empty);
    };
    let routes = AttributeRoutes::from_config(attrs);
    let Some(map_member) = output.member(routes.map_member) else {
        return Ok(empty);
    };

    let status = target.status_root();
    let map = Accessor::parse(response_var).field(&map_member.name);
    let mut statements = Vec::new();

    for field in crd.status_fields.values() {
        if let FieldSource::AttributeKey(key) = &field.source {
            statements.push(guarded(
                map.key(key),
                status.field(&field.names.camel),
                AssignKind::Value,
            ));
        }
    }
    if let Some(owner) = routes.owner_account_id {
        statements.push(guarded(
            map.key(owner),
            status.field(METADATA_FIELD).field(METADATA_OWNER_ACCOUNT_ID),
            AssignKind::OwnerAccountId,
        ));
    }
    if let Some(arn) = routes.primary_identifier {
        statements.push(guarded(map.key(arn), arn_slot(&status), AssignKind::ResourceArn));
    }

    Ok(Program {
        direction: Direction::Inbound,
        statements,
    })
}
