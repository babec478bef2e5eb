//! Resource model derivation and field assignment synthesis
//!
//! Given a parsed [`ServiceModel`](ack_generator_common::ServiceModel) and
//! its [`GeneratorConfig`](ack_generator_common::GeneratorConfig), a
//! [`SchemaContext`] classifies operations by resource, partitions each
//! resource's fields into Spec and Status, and synthesizes the statements
//! that move values between resources and SDK payloads.
//!
//! ```no_run
//! use ack_generator_common::{GeneratorConfig, OpType, ServiceModel};
//! use ack_generator_model::SchemaContext;
//!
//! # fn run(model: &ServiceModel) -> ack_generator_common::Result<()> {
//! let config = GeneratorConfig::default();
//! let ctx = SchemaContext::new(model, &config);
//! for crd in ctx.crds()? {
//!     let program = ctx.set_input(crd, OpType::Create, "r.ko", "res")?;
//!     println!("{}: {} statements", crd.kind, program.statements.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod context;
pub mod crd;
pub mod identifier;
pub mod interpret;
pub mod operations;
pub mod program;
pub mod synth;
pub mod type_def;
pub mod types;
pub mod unwrap;

pub use attributes::AttributeRoutes;
pub use context::SchemaContext;
pub use crd::{Crd, CrdField, CrdOps, FieldSource};
pub use identifier::PrimaryIdentifier;
pub use operations::{NameConventionClassifier, OperationClassifier, OperationMap};
pub use program::{Accessor, AssignKind, Assignment, Direction, Program, Segment, Statement};
pub use synth::InboundTarget;
pub use type_def::{Attr, TypeDef};
pub use types::{Side, TypeResolver};
pub use unwrap::{unwrap_output, Unwrapped};
