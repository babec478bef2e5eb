//! Smithy model parser
//!
//! Parses AWS Smithy JSON AST format into a [`ServiceModel`](ack_generator_common::ServiceModel).
//!
//! Smithy specs are available at: https://github.com/aws/api-models-aws
//!
//! ## Format
//! Smithy JSON AST contains:
//! - Service definitions with operations and resources
//! - Shape definitions (structures, operations, primitives)
//! - Traits (metadata like documentation, required members, errors)
//!
//! Operations bound to resources are collected along with the service's
//! own operations. Shape IDs lose their namespace, and members that target
//! prelude shapes (`smithy.api#String`) get a matching scalar shape.
//!
//! ## Usage
//! ```rust,ignore
//! use ack_generator_parser::smithy::SmithyParser;
//!
//! let parser = SmithyParser::from_file("api-models-aws/sns/2010-03-31/sns-2010-03-31.json")?;
//! let service = parser.parse()?;
//! ```

mod converter;
mod parser;
mod types;

pub use parser::SmithyParser;
pub use types::*;
