//! Direct execution of synthesized programs against JSON documents
//!
//! Resources and SDK payloads are both plain JSON objects here: a field is
//! present when its key exists and is not `null`. The behavioral tests run
//! synthesized programs through it.

use crate::program::{Accessor, Program, Segment, Statement};
use ack_generator_common::{GeneratorError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Named JSON values a program reads and writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    vars: BTreeMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Value at `accessor`, if every step exists
    pub fn lookup(&self, accessor: &Accessor) -> Option<&Value> {
        let mut value = self.vars.get(&accessor.root)?;
        for segment in &accessor.segments {
            let (Segment::Field(name) | Segment::Key(name)) = segment;
            value = value.as_object()?.get(name)?;
        }
        Some(value)
    }

    fn is_present(&self, accessor: &Accessor) -> bool {
        self.lookup(accessor).is_some_and(|v| !v.is_null())
    }

    /// Write `value` at `accessor`, creating intermediate objects
    fn store(&mut self, accessor: &Accessor, value: Value) -> Result<()> {
        let mut slot = self
            .vars
            .entry(accessor.root.clone())
            .or_insert(Value::Null);
        for segment in &accessor.segments {
            let (Segment::Field(name) | Segment::Key(name)) = segment;
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            slot = match slot {
                Value::Object(object) => object.entry(name.clone()).or_insert(Value::Null),
                _ => {
                    return Err(GeneratorError::Generation(format!(
                        "cannot write {}: parent of {} is not an object",
                        accessor, name
                    )));
                }
            };
        }
        *slot = value;
        Ok(())
    }

    fn var(&self, name: &str) -> Result<Value> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| GeneratorError::Generation(format!("unbound variable {}", name)))
    }
}

/// Run `program` against `env`
pub fn execute(program: &Program, env: &mut Env) -> Result<()> {
    run(&program.statements, env)
}

fn run(statements: &[Statement], env: &mut Env) -> Result<()> {
    for statement in statements {
        match statement {
            Statement::NewStruct { var, .. } | Statement::NewMap { var, .. } => {
                env.insert(var.clone(), Value::Object(Map::new()));
            }
            Statement::NewList { var, .. } => env.insert(var.clone(), Value::Array(Vec::new())),
            Statement::Let { var, source, .. } => {
                let value = env.lookup(source).cloned().unwrap_or(Value::Null);
                env.insert(var.clone(), value);
            }
            Statement::IfPresent { source, body } => {
                if env.is_present(source) {
                    run(body, env)?;
                }
            }
            Statement::ForEachElement { source, iter, body } => {
                let items = match env.lookup(source) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                for item in items {
                    env.insert(iter.clone(), item);
                    run(body, env)?;
                }
            }
            Statement::ForEachEntry {
                source,
                key,
                value,
                body,
            } => {
                let entries = match env.lookup(source) {
                    Some(Value::Object(entries)) => entries.clone(),
                    _ => Map::new(),
                };
                for (k, v) in entries {
                    env.insert(key.clone(), Value::String(k));
                    env.insert(value.clone(), v);
                    run(body, env)?;
                }
            }
            Statement::IfSingleElement { source, elem, body } => {
                if let Some(Value::Array(items)) = env.lookup(source) {
                    if let [only] = items.as_slice() {
                        env.insert(elem.clone(), only.clone());
                        run(body, env)?;
                    }
                }
            }
            Statement::Append { list, value } => {
                let item = env.var(value)?;
                match env.vars.get_mut(list) {
                    Some(Value::Array(items)) => items.push(item),
                    _ => {
                        return Err(GeneratorError::Generation(format!("{} is not a list", list)));
                    }
                }
            }
            Statement::Insert { map, key, value } => {
                let Value::String(k) = env.var(key)? else {
                    return Err(GeneratorError::Generation(format!("map key {} is not a string", key)));
                };
                let item = env.var(value)?;
                match env.vars.get_mut(map) {
                    Some(Value::Object(entries)) => {
                        entries.insert(k, item);
                    }
                    _ => {
                        return Err(GeneratorError::Generation(format!("{} is not a map", map)));
                    }
                }
            }
            Statement::Assign { dest, source, .. } => {
                let value = env.lookup(source).cloned().unwrap_or(Value::Null);
                env.store(dest, value)?;
            }
        }
    }
    Ok(())
}
