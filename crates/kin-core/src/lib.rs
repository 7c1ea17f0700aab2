pub mod config;
pub mod data;
pub mod error;
pub mod id;
pub mod lint;
pub mod model;
pub mod mutation;
pub mod parser;

pub use config::{GraphConfig, RelationPolicy};
pub use data::FamilyData;
pub use error::FamilyError;
pub use id::PersonId;
pub use lint::{LintDiagnostic, lint_graph};
pub use model::*;
pub use mutation::{FamilyMutation, MutationEffect};
pub use parser::{BirthDate, parse_birth_date};
