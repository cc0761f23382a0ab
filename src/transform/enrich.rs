// src/transform/enrich.rs
use std::collections::HashMap;
use tracing::debug;

use crate::config::TransformOptions;
use crate::schema::names::{self, field};
use crate::schema::{ParsedDocument, Table};

/// One-to-one id → name lookup built from a single table.
#[derive(Debug, Default)]
pub struct Lookup {
    index: HashMap<String, String>,
}

impl Lookup {
    /// Index `key_field → value_field` of `table_name`; empty when the table
    /// is absent.
    pub fn build(doc: &ParsedDocument, table_name: &str, key_field: &str, value_field: &str) -> Self {
        let index = doc
            .get(table_name)
            .map(|t| t.index_by(key_field, value_field))
            .unwrap_or_default();
        Self { index }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(String::as_str)
    }

    /// Resolved name, or the raw id itself when it does not resolve.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).unwrap_or(id)
    }
}

/// Add `target` to every row of `table`, resolving `id_field` through
/// `lookup`. Returns how many non-empty ids did not resolve.
pub fn add_reference(table: &mut Table, id_field: &str, target: &str, lookup: &Lookup) -> usize {
    table.ensure_header(target);
    let mut unresolved = 0;
    for row in &mut table.rows {
        let id = row.value(id_field);
        if !id.is_empty() && lookup.get(id).is_none() {
            unresolved += 1;
        }
        let value = lookup.resolve(id).to_string();
        row.set(target, value);
    }
    unresolved
}

/// Every lookup the enrichment pass needs, built once per document.
struct Lookups {
    resource_names: Lookup,
    task_codes: Lookup,
    code_names: Lookup,
    code_type_names: Lookup,
}

impl Lookups {
    fn build(doc: &ParsedDocument) -> Self {
        Self {
            resource_names: Lookup::build(doc, names::RSRC, field::RSRC_ID, field::RSRC_NAME),
            task_codes: Lookup::build(doc, names::TASK, field::TASK_ID, field::TASK_CODE),
            code_names: Lookup::build(
                doc,
                names::ACTVCODE,
                field::ACTV_CODE_ID,
                field::ACTV_CODE_NAME,
            ),
            code_type_names: Lookup::build(
                doc,
                names::ACTVTYPE,
                field::ACTV_CODE_TYPE_ID,
                field::ACTV_CODE_TYPE,
            ),
        }
    }
}

/// Denormalize names into the predecessor, assignment and activity code
/// tables of `doc`. Tables the export does not carry are skipped.
pub fn enrich_references(doc: &mut ParsedDocument, project_id: &str, opts: &TransformOptions) {
    let lookups = Lookups::build(doc);

    if let Some(pred) = doc.get_mut(names::TASKPRED) {
        let missing = add_reference(pred, field::TASK_ID, field::TASK_ID_CODE, &lookups.task_codes)
            + add_reference(
                pred,
                field::PRED_TASK_ID,
                field::PRED_TASK_ID_CODE,
                &lookups.task_codes,
            );
        log_table(names::TASKPRED, pred, missing);
    }

    if let Some(assignments) = doc.get_mut(names::TASKRSRC) {
        let missing = add_reference(
            assignments,
            field::RSRC_ID,
            field::RSRC_ID_NAME,
            &lookups.resource_names,
        ) + add_reference(
            assignments,
            field::TASK_ID,
            field::TASK_ID_CODE,
            &lookups.task_codes,
        );
        if opts.stamp_project_id {
            assignments.ensure_header(field::PROJECT_ID);
            for row in &mut assignments.rows {
                row.set(field::PROJECT_ID, project_id);
            }
        }
        log_table(names::TASKRSRC, assignments, missing);
    }

    if let Some(codes) = doc.get_mut(names::ACTVCODE) {
        let missing = add_reference(
            codes,
            field::ACTV_CODE_TYPE_ID,
            field::ACTV_CODE_TYPE_NAME,
            &lookups.code_type_names,
        );
        log_table(names::ACTVCODE, codes, missing);
    }

    if let Some(task_codes) = doc.get_mut(names::TASKACTV) {
        let missing = add_reference(
            task_codes,
            field::ACTV_CODE_ID,
            field::ACTV_CODE_ID_NAME,
            &lookups.code_names,
        ) + add_reference(
            task_codes,
            field::ACTV_CODE_TYPE_ID,
            field::ACTV_CODE_TYPE_NAME,
            &lookups.code_type_names,
        ) + add_reference(
            task_codes,
            field::TASK_ID,
            field::TASK_ID_CODE,
            &lookups.task_codes,
        );
        log_table(names::TASKACTV, task_codes, missing);
    }
}

fn log_table(name: &str, table: &Table, unresolved: usize) {
    debug!(table = name, rows = table.rows.len(), unresolved, "references enriched");
}
