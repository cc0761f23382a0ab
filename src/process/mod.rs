// src/process/mod.rs
pub mod parse;

use anyhow::{Context, Result};
use chrono::Utc;
use std::{fs, path::Path};
use tracing::{info, instrument, warn};

use crate::config::TransformOptions;
use crate::error;
use crate::schema::names::{self, field};
use crate::schema::ParsedDocument;
use crate::transform::{transform, EnrichedDocument};

pub use parse::parse_xer;

/// The export's own project id (first `PROJECT` row's `proj_id`), or a
/// time-based placeholder so every import stays addressable.
pub fn resolve_project_id(doc: &ParsedDocument, opts: &TransformOptions) -> String {
    let declared = doc
        .get(names::PROJECT)
        .and_then(|t| t.rows.first())
        .map(|row| row.value(field::PROJ_ID).trim())
        .filter(|id| !id.is_empty());

    match declared {
        Some(id) => id.to_string(),
        None => {
            let id = format!(
                "{}{}",
                opts.fallback_project_prefix,
                Utc::now().timestamp_millis()
            );
            warn!(project_id = %id, "export has no project id, using placeholder");
            id
        }
    }
}

/// Parse, pick the project id, transform.
#[instrument(level = "info", skip(text, opts), fields(bytes = text.len()))]
pub fn process_xer_file(
    text: &str,
    opts: &TransformOptions,
) -> error::Result<EnrichedDocument> {
    let parsed = parse_xer(text);
    let project_id = resolve_project_id(&parsed, opts);
    let enriched = transform(&parsed, &project_id, opts)?;
    info!(
        project_id = %enriched.project_id,
        tables = enriched.document.len(),
        rows = enriched.document.row_count(),
        "export processed"
    );
    Ok(enriched)
}

/// Read an export from disk and process it. Bytes that are not UTF-8 (P6
/// often writes Windows-1252) are replaced rather than rejected.
#[instrument(level = "info", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn process_xer_path<P: AsRef<Path>>(path: P, opts: &TransformOptions) -> Result<EnrichedDocument> {
    let bytes = fs::read(&path)
        .with_context(|| format!("Failed to read XER file: {:?}", path.as_ref()))?;
    let text = String::from_utf8_lossy(&bytes);
    process_xer_file(&text, opts)
        .with_context(|| format!("Failed to transform {:?}", path.as_ref()))
}
