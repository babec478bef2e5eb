//! Go rendering of synthesized field assignment programs
//!
//! Outbound programs fill `aws-sdk-go` request structs through their
//! generated setters. Inbound programs assign response members directly
//! onto the controller's API types.

use ack_generator_common::{FieldType, ScalarType};
use ack_generator_model::identifier::METADATA_FIELD;
use ack_generator_model::{Accessor, AssignKind, Direction, Program, Segment, Statement};
use std::collections::{BTreeSet, HashSet};

pub const SDK_ALIAS: &str = "svcsdk";
pub const API_TYPES_ALIAS: &str = "svcapitypes";
pub const ACK_CORE_ALIAS: &str = "ackv1alpha1";
pub const METAV1_ALIAS: &str = "metav1";
pub const TIME_PACKAGE: &str = "time";

/// Go type of a field.
///
/// `structs` prefixes named structures (a package alias with its dot, or
/// nothing for types in the same package). `time` is the timestamp type.
pub fn go_type(field_type: &FieldType, structs: &str, time: &str) -> String {
    match field_type {
        FieldType::String => "*string".to_string(),
        FieldType::Integer => "*int64".to_string(),
        FieldType::Float => "*float64".to_string(),
        FieldType::Boolean => "*bool".to_string(),
        FieldType::DateTime => format!("*{}", time),
        FieldType::Blob => "[]byte".to_string(),
        FieldType::Structure(name) => format!("*{}{}", structs, name),
        FieldType::List(elem) => format!("[]{}", go_type(elem, structs, time)),
        FieldType::Map(_, value) => format!("map[string]{}", go_type(value, structs, time)),
    }
}

/// Rendered statements plus the package aliases they reference beyond
/// `svcsdk` and `svcapitypes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoBlock {
    pub code: String,
    pub imports: BTreeSet<&'static str>,
}

/// Renders one [`Program`] as Go statements
pub struct GoRenderer {
    direction: Direction,
    /// Temporaries holding scalar values, appended or inserted by address
    scalars: HashSet<String>,
    imports: BTreeSet<&'static str>,
    out: String,
}

impl GoRenderer {
    /// Render `program` with its outermost statements at `depth` tabs
    pub fn render(program: &Program, depth: usize) -> GoBlock {
        let mut renderer = Self {
            direction: program.direction,
            scalars: HashSet::new(),
            imports: BTreeSet::new(),
            out: String::new(),
        };
        renderer.statements(&program.statements, depth);
        GoBlock {
            code: renderer.out,
            imports: renderer.imports,
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn statements(&mut self, statements: &[Statement], depth: usize) {
        for statement in statements {
            self.statement(statement, depth);
        }
    }

    fn statement(&mut self, statement: &Statement, depth: usize) {
        match statement {
            Statement::NewStruct { var, type_name } => {
                let text = format!("{} := &{}.{}{{}}", var, self.structs_alias(), type_name);
                self.line(depth, &text);
            }
            Statement::NewList { var, elem } => {
                let list = FieldType::List(Box::new(elem.clone()));
                let text = format!("{} := {}{{}}", var, self.field_type(&list));
                self.line(depth, &text);
            }
            Statement::NewMap { var, value } => {
                let map = FieldType::Map(Box::new(FieldType::String), Box::new(value.clone()));
                let text = format!("{} := {}{{}}", var, self.field_type(&map));
                self.line(depth, &text);
            }
            Statement::Let { var, source, scalar } => {
                let declared = format!("var {} {}", var, self.scalar_type(*scalar));
                self.line(depth, &declared);
                let value = self.scalar_value(source, *scalar);
                self.line(depth, &format!("{} = {}", var, value));
                if *scalar != ScalarType::Blob {
                    self.scalars.insert(var.clone());
                }
            }
            Statement::IfPresent { source, body } => {
                self.line(depth, &format!("if {} {{", presence(source)));
                self.statements(body, depth + 1);
                self.line(depth, "}");
            }
            Statement::ForEachElement { source, iter, body } => {
                self.line(depth, &format!("for _, {} := range {} {{", iter, source));
                self.statements(body, depth + 1);
                self.line(depth, "}");
            }
            Statement::ForEachEntry {
                source,
                key,
                value,
                body,
            } => {
                self.line(depth, &format!("for {}, {} := range {} {{", key, value, source));
                self.statements(body, depth + 1);
                self.line(depth, "}");
            }
            Statement::IfSingleElement { source, elem, body } => {
                self.line(depth, &format!("if len({}) == 1 {{", source));
                self.line(depth + 1, &format!("{} := {}[0]", elem, source));
                self.statements(body, depth + 1);
                self.line(depth, "}");
            }
            Statement::Append { list, value } => {
                let text = format!("{} = append({}, {})", list, list, self.by_address(value));
                self.line(depth, &text);
            }
            Statement::Insert { map, key, value } => {
                let text = format!("{}[{}] = {}", map, key, self.by_address(value));
                self.line(depth, &text);
            }
            Statement::Assign { dest, source, kind } => match self.direction {
                Direction::Outbound => self.set(dest, source, *kind, depth),
                Direction::Inbound => self.assign(dest, source, *kind, depth),
            },
        }
    }

    /// Outbound: call the SDK setter, or index the attribute map
    fn set(&mut self, dest: &Accessor, source: &Accessor, kind: AssignKind, depth: usize) {
        let value = match kind {
            AssignKind::Scalar(scalar) => self.scalar_value(source, scalar),
            AssignKind::Value => source.to_string(),
            AssignKind::ResourceArn | AssignKind::OwnerAccountId => format!("string(*{})", source),
        };
        let text = match (dest.parent(), dest.last()) {
            (Some(parent), Some(Segment::Field(name))) => format!("{}.Set{}({})", parent, name, value),
            _ => format!("{} = {}", dest, value),
        };
        self.line(depth, &text);
    }

    /// Inbound: plain assignment, wrapping metadata values in their ACK types
    fn assign(&mut self, dest: &Accessor, source: &Accessor, kind: AssignKind, depth: usize) {
        match kind {
            AssignKind::Scalar(ScalarType::Timestamp) => {
                self.imports.insert(METAV1_ALIAS);
                self.line(depth, &format!("{} = &metav1.Time{{Time: *{}}}", dest, source));
            }
            AssignKind::Scalar(_) | AssignKind::Value => {
                self.line(depth, &format!("{} = {}", dest, source));
            }
            AssignKind::ResourceArn => self.metadata(dest, source, "arn", "AWSResourceName", depth),
            AssignKind::OwnerAccountId => {
                self.metadata(dest, source, "ownerAccountID", "AWSAccountID", depth)
            }
        }
    }

    fn metadata(&mut self, dest: &Accessor, source: &Accessor, var: &str, ack_type: &str, depth: usize) {
        self.imports.insert(ACK_CORE_ALIAS);
        if let Some(metadata) = dest.parent() {
            self.line(depth, &format!("if {} == nil {{", metadata));
            self.line(depth + 1, &format!("{} = &ackv1alpha1.ResourceMetadata{{}}", metadata));
            self.line(depth, "}");
        }
        self.line(depth, &format!("{} := ackv1alpha1.{}(*{})", var, ack_type, source));
        self.line(depth, &format!("{} = &{}", dest, var));
    }

    fn by_address(&self, var: &str) -> String {
        if self.scalars.contains(var) {
            format!("&{}", var)
        } else {
            var.to_string()
        }
    }

    fn structs_alias(&self) -> &'static str {
        match self.direction {
            Direction::Outbound => SDK_ALIAS,
            Direction::Inbound => API_TYPES_ALIAS,
        }
    }

    fn time_type(&mut self) -> &'static str {
        match self.direction {
            Direction::Outbound => {
                self.imports.insert(TIME_PACKAGE);
                "time.Time"
            }
            Direction::Inbound => {
                self.imports.insert(METAV1_ALIAS);
                "metav1.Time"
            }
        }
    }

    fn field_type(&mut self, field_type: &FieldType) -> String {
        let time = if field_type.contains_date_time() {
            self.time_type()
        } else {
            ""
        };
        let structs = format!("{}.", self.structs_alias());
        go_type(field_type, &structs, time)
    }

    fn scalar_type(&mut self, scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::String => "string",
            ScalarType::Integer | ScalarType::Long => "int64",
            ScalarType::Float | ScalarType::Double => "float64",
            ScalarType::Boolean => "bool",
            ScalarType::Timestamp => self.time_type(),
            ScalarType::Blob => "[]byte",
        }
    }

    /// The scalar value held by the pointer at `source`
    fn scalar_value(&mut self, source: &Accessor, scalar: ScalarType) -> String {
        match (scalar, self.direction) {
            (ScalarType::Blob, _) => source.to_string(),
            (ScalarType::Timestamp, Direction::Outbound) => format!("{}.Time", source),
            (ScalarType::Timestamp, Direction::Inbound) => {
                self.imports.insert(METAV1_ALIAS);
                format!("metav1.Time{{Time: *{}}}", source)
            }
            _ => format!("*{}", source),
        }
    }
}

/// Go condition that holds when `source` is set. Reads through the
/// resource metadata check the metadata pointer first.
fn presence(source: &Accessor) -> String {
    let through_metadata = source.contains_field(METADATA_FIELD)
        && !matches!(source.last(), Some(Segment::Field(f)) if f == METADATA_FIELD);
    if through_metadata {
        let depth = source
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Field(f) if f == METADATA_FIELD))
            .map_or(0, |i| i + 1);
        let metadata = Accessor {
            root: source.root.clone(),
            segments: source.segments[..depth].to_vec(),
        };
        return format!("{} != nil && {} != nil", metadata, source);
    }
    format!("{} != nil", source)
}
