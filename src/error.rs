//! Errors surfaced by the transformation core.
//!
//! Malformed text and dangling references degrade to partial output and
//! never show up here. Only input that cannot be resolved in bounded time
//! is reported.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A `parent_wbs_id` chain loops back on itself.
    #[error("malformed hierarchy: WBS node {wbs_id} is part of a parent cycle")]
    CyclicHierarchy { wbs_id: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
