// src/transform/mod.rs
pub mod dates;
pub mod enrich;
pub mod hierarchy;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::TransformOptions;
use crate::error::Result;
use crate::schema::names::{self, field};
use crate::schema::{ParsedDocument, Table};

pub use dates::normalize_task_dates;
pub use enrich::{enrich_references, Lookup};
pub use hierarchy::{build_hierarchy, Hierarchy, WbsHierarchyNode, STABLE_ID_SEPARATOR};

/// A transformed export, ready to be stored under `project_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedDocument {
    pub project_id: String,
    pub document: ParsedDocument,
}

impl EnrichedDocument {
    /// Typed view of the `WBS_HIERARCHY` table.
    pub fn hierarchy(&self) -> Vec<WbsHierarchyNode> {
        self.document
            .get(names::WBS_HIERARCHY)
            .map(|t| {
                t.rows
                    .iter()
                    .filter_map(WbsHierarchyNode::from_record)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Transform a parsed export into its enriched form.
///
/// Works on a copy; `doc` stays untouched. Adds the `WBS_HIERARCHY` table,
/// links tasks to it through `wbs_stable_id_ref`, normalizes task dates and
/// denormalizes names into the reference tables. Running it again on its own
/// output rebuilds the same fields without duplicating headers.
#[instrument(level = "debug", skip(doc, opts), fields(tables = doc.len()))]
pub fn transform(
    doc: &ParsedDocument,
    project_id: &str,
    opts: &TransformOptions,
) -> Result<EnrichedDocument> {
    let mut out = doc.clone();

    let hierarchy = match doc.get(names::PROJWBS) {
        Some(wbs) => build_hierarchy(wbs)?,
        None => Hierarchy::default(),
    };

    if let Some(task) = out.get_mut(names::TASK) {
        link_tasks(task, &hierarchy);
        normalize_task_dates(task);
    }

    enrich_references(&mut out, project_id, opts);
    out.insert(names::WBS_HIERARCHY, hierarchy.into_table());

    debug!(rows = out.row_count(), "transform complete");
    Ok(EnrichedDocument {
        project_id: project_id.to_string(),
        document: out,
    })
}

/// Point every task at its row in `WBS_HIERARCHY`; `""` when the task's
/// `wbs_id` is unknown or is a root, since roots are not materialized.
fn link_tasks(task: &mut Table, hierarchy: &Hierarchy) {
    task.ensure_header(field::WBS_STABLE_ID_REF);
    let mut unlinked = 0usize;
    for row in &mut task.rows {
        let stable = hierarchy
            .node_stable_id(row.value(field::WBS_ID))
            .unwrap_or_default()
            .to_string();
        if stable.is_empty() {
            unlinked += 1;
        }
        row.set(field::WBS_STABLE_ID_REF, stable);
    }
    debug!(tasks = task.rows.len(), unlinked, "tasks linked to WBS");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::process::parse_xer;

    const SAMPLE: &str = "%T\tPROJECT\n%F\tproj_id\tproj_short_name\n%R\t42\tDEMO\n\
%T\tPROJWBS\n%F\twbs_id\tproj_id\twbs_name\tparent_wbs_id\n\
%R\t1\t42\tRoot\t\n%R\t2\t42\tPhase A\t1\n%R\t3\t42\tTask Group\t2\n\
%T\tTASK\n%F\ttask_id\twbs_id\ttask_code\tearly_start_date\n\
%R\t10\t3\tA1000\t2024-01-02 08:00\n%R\t11\t99\tA1010\t\n\
%T\tTASKPRED\n%F\ttask_pred_id\ttask_id\tpred_task_id\n%R\t1\t11\t10\n%R\t2\t11\t404\n\
%T\tTASKRSRC\n%F\ttaskrsrc_id\ttask_id\trsrc_id\n%R\t5\t10\t1\n";

    #[test]
    fn builds_hierarchy_and_links_tasks() -> anyhow::Result<()> {
        let parsed = parse_xer(SAMPLE);
        let enriched = transform(&parsed, "42", &TransformOptions::default())?;

        let nodes = enriched.hierarchy();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].stable_wbs_id, "Root > Phase A");
        assert_eq!(nodes[0].level, 0);
        assert_eq!(nodes[0].parent_stable_wbs_id, None);
        assert_eq!(nodes[1].stable_wbs_id, "Root > Phase A > Task Group");
        assert_eq!(nodes[1].level, 1);
        assert_eq!(nodes[1].parent_stable_wbs_id.as_deref(), Some("Root > Phase A"));

        let task = enriched.document.get(names::TASK).expect("TASK");
        assert_eq!(
            task.rows[0].value(field::WBS_STABLE_ID_REF),
            "Root > Phase A > Task Group"
        );
        assert_eq!(task.rows[0].value("start_date"), "2024-01-02 08:00");
        assert_eq!(task.rows[1].get(field::WBS_STABLE_ID_REF), Some(""));

        let pred = enriched.document.get(names::TASKPRED).expect("TASKPRED");
        assert_eq!(pred.rows[1].value(field::PRED_TASK_ID_CODE), "404");
        Ok(())
    }

    #[test]
    fn task_on_root_node_links_to_nothing() -> anyhow::Result<()> {
        let text = "%T\tPROJWBS\n%F\twbs_id\twbs_name\tparent_wbs_id\n\
%R\t1\tRoot\t\n%R\t2\tPhase A\t1\n\
%T\tTASK\n%F\ttask_id\twbs_id\n%R\t10\t1\n%R\t11\t2\n";
        let enriched = transform(&parse_xer(text), "p", &TransformOptions::default())?;
        let task = enriched.document.get(names::TASK).expect("TASK");
        assert_eq!(task.rows[0].get(field::WBS_STABLE_ID_REF), Some(""));
        assert_eq!(task.rows[1].value(field::WBS_STABLE_ID_REF), "Root > Phase A");

        let stable_ids: Vec<_> = enriched
            .hierarchy()
            .into_iter()
            .map(|n| n.stable_wbs_id)
            .collect();
        for row in &task.rows {
            let reference = row.value(field::WBS_STABLE_ID_REF);
            assert!(reference.is_empty() || stable_ids.iter().any(|id| id == reference));
        }
        Ok(())
    }

    #[test]
    fn input_document_is_not_modified() -> anyhow::Result<()> {
        let parsed = parse_xer(SAMPLE);
        let before = parsed.clone();
        let _ = transform(&parsed, "42", &TransformOptions::default())?;
        assert_eq!(parsed, before);
        assert!(parsed.get(names::WBS_HIERARCHY).is_none());
        Ok(())
    }

    #[test]
    fn retransform_does_not_duplicate_headers() -> anyhow::Result<()> {
        let opts = TransformOptions::default();
        let once = transform(&parse_xer(SAMPLE), "42", &opts)?;
        let twice = transform(&once.document, "42", &opts)?;

        for (name, table) in twice.document.iter() {
            let mut headers = table.headers.clone();
            headers.sort();
            headers.dedup();
            assert_eq!(headers.len(), table.headers.len(), "duplicate header in {}", name);
        }
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn cyclic_wbs_fails() {
        let text = "%T\tPROJWBS\n%F\twbs_id\twbs_name\tparent_wbs_id\n%R\t1\tA\t2\n%R\t2\tB\t1\n";
        let err = transform(&parse_xer(text), "p", &TransformOptions::default()).unwrap_err();
        assert!(matches!(err, TransformError::CyclicHierarchy { .. }));
    }

    #[test]
    fn empty_document_gets_an_empty_hierarchy_table() -> anyhow::Result<()> {
        let enriched = transform(&ParsedDocument::new(), "p", &TransformOptions::default())?;
        let hierarchy = enriched
            .document
            .get(names::WBS_HIERARCHY)
            .expect("hierarchy table");
        assert!(hierarchy.rows.is_empty());
        assert_eq!(hierarchy.headers, WbsHierarchyNode::headers());
        Ok(())
    }
}
