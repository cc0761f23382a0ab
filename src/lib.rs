//! Import of Primavera P6 XER exports into enriched, cross-referenced tables.
//!
//! [`process::parse_xer`] turns export text into a [`ParsedDocument`];
//! [`transform::transform`] derives the stable WBS hierarchy and denormalized
//! reference fields; [`process::process_xer_file`] composes both.

pub mod config;
pub mod error;
pub mod process;
pub mod schema;
pub mod store;
pub mod transform;

pub use config::{Config, TransformOptions};
pub use error::TransformError;
pub use process::{parse_xer, process_xer_file, process_xer_path, resolve_project_id};
pub use schema::{ExportHeader, ParsedDocument, Record, Table};
pub use store::{ProjectEntry, ProjectStore};
pub use transform::{transform, EnrichedDocument, WbsHierarchyNode};
