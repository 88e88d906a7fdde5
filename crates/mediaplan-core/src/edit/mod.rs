//! Field edits: path parsing and immutable application to a plan snapshot.

pub mod apply;
pub mod path;

pub use apply::{AppliedEdit, EditError, apply_edit};
pub use path::{FieldPath, FieldPathError, PathSegment};
