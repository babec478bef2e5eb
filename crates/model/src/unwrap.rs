//! Response wrapper unwrapping
//!
//! REST-style services return `{"repository": {...}}` from their create and
//! describe calls. The generator needs the inner shape and the member name
//! that reaches it.

use ack_generator_common::{Result, ServiceModel, Shape};

/// An output shape with any single-member wrapper removed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unwrapped<'a> {
    pub shape: &'a Shape,
    /// Wrapper member name to prepend to source accessors, if unwrapped
    pub accessor: Option<&'a str>,
}

/// Strip a single-member wrapper envelope from an operation output shape.
///
/// A shape is a wrapper when it is used as an operation output and has
/// exactly one member whose shape is a structure. Anything else is returned
/// unchanged with no accessor prefix.
pub fn unwrap_output<'a>(model: &'a ServiceModel, shape: &'a Shape) -> Result<Unwrapped<'a>> {
    let unchanged = Unwrapped {
        shape,
        accessor: None,
    };

    let [member] = shape.members() else {
        return Ok(unchanged);
    };
    if !shape.used_as_output {
        return Ok(unchanged);
    }

    let context = format!("{}.{}", shape.name, member.name);
    let inner = model.resolve(&member.target, &context)?;
    if !inner.is_structure() {
        return Ok(unchanged);
    }

    Ok(Unwrapped {
        shape: inner,
        accessor: Some(member.name.as_str()),
    })
}
