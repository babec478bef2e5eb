//! Synthesized field assignment programs
//!
//! A [`Program`] is the language-neutral result of field assignment
//! synthesis. Renderers turn it into target-language source, and
//! [`crate::interpret`] can execute it directly against JSON documents.

use ack_generator_common::{FieldType, ScalarType};
use serde::Serialize;
use std::fmt;

/// Which side of the API boundary a program writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Resource fields into an SDK request shape
    Outbound,
    /// SDK response shape into resource fields
    Inbound,
}

/// One step of an accessor path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    /// `.Name`
    Field(String),
    /// `["key"]`
    Key(String),
}

/// A root variable followed by field and map-key steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accessor {
    pub root: String,
    pub segments: Vec<Segment>,
}

impl Accessor {
    pub fn var(name: impl Into<String>) -> Self {
        Self {
            root: name.into(),
            segments: Vec::new(),
        }
    }

    /// Parse a dotted path such as `r.ko.Spec`
    pub fn parse(path: &str) -> Self {
        let mut parts = path.split('.').filter(|p| !p.is_empty());
        let root = parts.next().unwrap_or_default().to_string();
        Self {
            root,
            segments: parts.map(|p| Segment::Field(p.to_string())).collect(),
        }
    }

    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Field(name.into()));
        next
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// The accessor without its last segment
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(f) if f == name))
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

/// How a value is copied by an [`Statement::Assign`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignKind {
    /// A present scalar value
    Scalar(ScalarType),
    /// A temporary or an attribute map entry, copied as is
    Value,
    /// The resource ARN, to or from the standard metadata slot
    ResourceArn,
    /// The owning account ID, into the standard metadata slot
    OwnerAccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Statement {
    /// Bind `var` to a fresh, empty structure of `type_name`
    NewStruct { var: String, type_name: String },
    /// Bind `var` to a fresh, empty list
    NewList { var: String, elem: FieldType },
    /// Bind `var` to a fresh, empty string-keyed map
    NewMap { var: String, value: FieldType },
    /// Bind `var` to a copy of the scalar at `source`
    Let {
        var: String,
        source: Accessor,
        scalar: ScalarType,
    },
    /// Run `body` only when `source` holds a value
    IfPresent {
        source: Accessor,
        body: Vec<Statement>,
    },
    /// Run `body` once per element of the list at `source`, in order
    ForEachElement {
        source: Accessor,
        iter: String,
        body: Vec<Statement>,
    },
    /// Run `body` once per entry of the map at `source`
    ForEachEntry {
        source: Accessor,
        key: String,
        value: String,
        body: Vec<Statement>,
    },
    /// Run `body` with `elem` bound when the list at `source` has exactly
    /// one element
    IfSingleElement {
        source: Accessor,
        elem: String,
        body: Vec<Statement>,
    },
    Append { list: String, value: String },
    Insert {
        map: String,
        key: String,
        value: String,
    },
    Assign {
        dest: Accessor,
        source: Accessor,
        kind: AssignKind,
    },
}

impl Statement {
    /// Nested statements of block statements
    pub fn body(&self) -> Option<&[Statement]> {
        match self {
            Statement::IfPresent { body, .. }
            | Statement::ForEachElement { body, .. }
            | Statement::ForEachEntry { body, .. }
            | Statement::IfSingleElement { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Flattened view of one assignment in a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub destination: String,
    pub source: String,
    pub kind: AssignKind,
    /// Number of enclosing block statements
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub direction: Direction,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            statements: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every assignment in execution order as (destination, source, kind)
    /// records
    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        collect_assignments(&self.statements, 0, &mut out);
        out
    }
}

fn collect_assignments(statements: &[Statement], depth: usize, out: &mut Vec<Assignment>) {
    for statement in statements {
        match statement {
            Statement::Assign { dest, source, kind } => out.push(Assignment {
                destination: dest.to_string(),
                source: source.to_string(),
                kind: *kind,
                depth,
            }),
            Statement::Append { list, value } => out.push(Assignment {
                destination: list.clone(),
                source: value.clone(),
                kind: AssignKind::Value,
                depth,
            }),
            Statement::Insert { map, key, value } => out.push(Assignment {
                destination: format!("{}[{}]", map, key),
                source: value.clone(),
                kind: AssignKind::Value,
                depth,
            }),
            other => {
                if let Some(body) = other.body() {
                    collect_assignments(body, depth + 1, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_parse_and_display() {
        let acc = Accessor::parse("r.ko.Spec").field("Name");
        assert_eq!(acc.root, "r");
        assert_eq!(acc.to_string(), "r.ko.Spec.Name");
        assert_eq!(acc.parent().unwrap().to_string(), "r.ko.Spec");

        let key = Accessor::var("resp").field("Attributes").key("TopicArn");
        assert_eq!(key.to_string(), r#"resp.Attributes["TopicArn"]"#);
        assert!(key.contains_field("Attributes"));
        assert_eq!(Accessor::var("f0").parent(), None);
    }

    #[test]
    fn test_assignments_flatten_with_depth() {
        let program = Program {
            direction: Direction::Inbound,
            statements: vec![Statement::IfPresent {
                source: Accessor::parse("resp.Tags"),
                body: vec![
                    Statement::NewList {
                        var: "f0".to_string(),
                        elem: FieldType::String,
                    },
                    Statement::ForEachElement {
                        source: Accessor::parse("resp.Tags"),
                        iter: "f0iter".to_string(),
                        body: vec![
                            Statement::Let {
                                var: "f0elem".to_string(),
                                source: Accessor::var("f0iter"),
                                scalar: ScalarType::String,
                            },
                            Statement::Append {
                                list: "f0".to_string(),
                                value: "f0elem".to_string(),
                            },
                        ],
                    },
                    Statement::Assign {
                        dest: Accessor::parse("ko.Status.Tags"),
                        source: Accessor::var("f0"),
                        kind: AssignKind::Value,
                    },
                ],
            }],
        };

        let flat = program.assignments();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].destination, "f0");
        assert_eq!(flat[0].depth, 2);
        assert_eq!(flat[1].destination, "ko.Status.Tags");
        assert_eq!(flat[1].source, "f0");
        assert_eq!(flat[1].depth, 1);
    }
}
