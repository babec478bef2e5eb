//! AWS JSON service model parser
//!
//! Parses the `api-2.json` service models shipped with the AWS SDKs
//! (`models/apis/<service>/<version>/api-2.json` in aws-sdk-go) into a
//! [`ServiceModel`](ack_generator_common::ServiceModel).
//!
//! ## Format
//! - `metadata`: service identity (`serviceId`, `apiVersion`, `protocol`)
//! - `operations`: name to `input`/`output`/`errors` shape references
//! - `shapes`: name to a typed shape (`structure`, `list`, `map`, scalars)
//!
//! ## Usage
//! ```rust,ignore
//! use ack_generator_parser::api_json::ApiModelParser;
//!
//! let parser = ApiModelParser::from_file("models/apis/sns/2010-03-31/api-2.json")?;
//! let service = parser.parse()?;
//! ```

mod converter;
mod parser;
mod types;

pub use parser::ApiModelParser;
pub use types::*;
