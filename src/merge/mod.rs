//! Merge operations for project metadata models
//!
//! This module provides the inheritance merge used to complete a
//! dependency's metadata from a supplemental fragment before the
//! dependency can be listed in generated resources.
//!
//! ## Precedence
//!
//! The merge is field-by-field and list-aware: any field already set on the
//! child is preserved, any unset field is filled from the parent. List
//! fields use one of three strategies chosen by the field's semantics:
//!
//! - **Replace-if-empty** (developers, contributors, licenses, mailing
//!   lists, build resources, filters): a non-empty child list is used
//!   unmodified, otherwise the parent's list is taken wholesale.
//! - **Union by identity** (build extensions): parent entries are appended
//!   only when not already present by equality.
//! - **Union by key, child overrides parent** (dependencies,
//!   dependency-management entries, report plugins): parent entries are
//!   merged in only for keys the child does not define; keyed orderings are
//!   reproducible.
//!
//! URL-shaped fields inherit with path appending (see [`crate::path`]).
//!
//! The merge is a set of stateless free functions taking all inputs as
//! parameters; it is total over well-formed inputs and never fails.

pub mod inherit;

pub use inherit::{assemble_model_inheritance, assemble_model_inheritance_with_adjustment};
