//! Restricted structural schema validation for artifact trees.
//!
//! Three layers: [`validate_value`] checks one JSON value against a
//! [`SchemaDocument`]; [`SchemaCatalog`] loads schemas from a tree and plugs
//! into the store as its pre-write hook; [`validate_tree`] sweeps a whole
//! tree and reports per-file verdicts.

mod batch;
mod catalog;
mod document;
mod validate;

pub use batch::BatchOutcome;
pub use batch::FileReport;
pub use batch::MACHINE_SUMMARY_MARKER;
pub use batch::validate_tree;
pub use catalog::SchemaCatalog;
pub use document::AdditionalProperties;
pub use document::SchemaDocument;
pub use document::SchemaType;
pub use validate::Violation;
pub use validate::validate_value;
