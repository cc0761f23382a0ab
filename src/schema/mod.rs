pub mod names;
mod ordered;
pub mod types;

pub use types::{ExportHeader, ParsedDocument, Record, Table};
