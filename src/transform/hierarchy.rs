// src/transform/hierarchy.rs
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::{Result, TransformError};
use crate::schema::names::field;
use crate::schema::{Record, Table};

/// Joins WBS names from the root down to a node.
pub const STABLE_ID_SEPARATOR: &str = " > ";

/// One materialized row of `WBS_HIERARCHY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbsHierarchyNode {
    pub stable_wbs_id: String,
    /// Export-local id the node was built from.
    pub wbs_id: String,
    pub wbs_name: String,
    /// 0 for the children of a root.
    pub level: usize,
    /// `None` when the parent is a root.
    pub parent_stable_wbs_id: Option<String>,
}

impl WbsHierarchyNode {
    pub fn headers() -> Vec<String> {
        [
            field::STABLE_WBS_ID,
            field::WBS_ID,
            field::WBS_NAME,
            field::LEVEL,
            field::PARENT_STABLE_WBS_ID,
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    pub fn to_record(&self) -> Record {
        let level = self.level.to_string();
        let parent = self.parent_stable_wbs_id.as_deref().unwrap_or("");
        [
            (field::STABLE_WBS_ID, self.stable_wbs_id.as_str()),
            (field::WBS_ID, self.wbs_id.as_str()),
            (field::WBS_NAME, self.wbs_name.as_str()),
            (field::LEVEL, level.as_str()),
            (field::PARENT_STABLE_WBS_ID, parent),
        ]
        .into_iter()
        .collect()
    }

    /// Read a `WBS_HIERARCHY` row back; `None` if `level` is not a number.
    pub fn from_record(record: &Record) -> Option<Self> {
        let parent = record.value(field::PARENT_STABLE_WBS_ID);
        Some(Self {
            stable_wbs_id: record.value(field::STABLE_WBS_ID).to_string(),
            wbs_id: record.value(field::WBS_ID).to_string(),
            wbs_name: record.value(field::WBS_NAME).to_string(),
            level: record.value(field::LEVEL).parse().ok()?,
            parent_stable_wbs_id: (!parent.is_empty()).then(|| parent.to_string()),
        })
    }
}

/// Stable ids for every WBS row plus the flattened, root-less hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<WbsHierarchyNode>,
    roots: Vec<String>,
    stable_ids: HashMap<String, String>,
}

impl Hierarchy {
    /// Stable id for an export-local `wbs_id`, roots included.
    pub fn stable_id(&self, wbs_id: &str) -> Option<&str> {
        self.stable_ids.get(wbs_id).map(String::as_str)
    }

    /// Materialized nodes, in `PROJWBS` row order.
    pub fn nodes(&self) -> &[WbsHierarchyNode] {
        &self.nodes
    }

    /// Stable id of a materialized node; `None` for roots and unknown ids.
    pub fn node_stable_id(&self, wbs_id: &str) -> Option<&str> {
        if self.roots.iter().any(|r| r == wbs_id) {
            return None;
        }
        self.stable_id(wbs_id)
    }

    /// `wbs_id`s of the rows without a resolvable parent.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn into_table(self) -> Table {
        let mut table = Table::new(WbsHierarchyNode::headers());
        table.rows = self.nodes.iter().map(WbsHierarchyNode::to_record).collect();
        table
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    Done,
}

struct Node<'a> {
    id: &'a str,
    name: &'a str,
    parent_ref: &'a str,
    parent: Option<usize>,
}

/// Build stable ids and levels for every row of a `PROJWBS` table.
///
/// A row whose `parent_wbs_id` is empty or unknown is a root. Roots are never
/// materialized; their children sit at level 0 with no parent. Each node is
/// resolved once: the walk climbs until it meets a resolved node or a root,
/// then fills in the path top-down. Meeting a node already on the current
/// path is a cycle and fails the whole build.
pub fn build_hierarchy(wbs: &Table) -> Result<Hierarchy> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(wbs.rows.len());
    let mut arena: Vec<Node<'_>> = Vec::with_capacity(wbs.rows.len());
    for row in &wbs.rows {
        let id = row.value(field::WBS_ID);
        if id.is_empty() {
            warn!("skipping WBS row without wbs_id");
            continue;
        }
        if index.contains_key(id) {
            warn!(wbs_id = id, "duplicate wbs_id, keeping first row");
            continue;
        }
        index.insert(id, arena.len());
        arena.push(Node {
            id,
            name: row.value(field::WBS_NAME),
            parent_ref: row.value(field::PARENT_WBS_ID),
            parent: None,
        });
    }
    for node in arena.iter_mut() {
        node.parent = index.get(node.parent_ref).copied();
    }

    // (depth, stable id) per arena slot, valid once the slot is Done
    let mut resolved: Vec<(usize, String)> = vec![(0, String::new()); arena.len()];
    let mut visit = vec![Visit::New; arena.len()];
    let mut path = Vec::new();

    for start in 0..arena.len() {
        let mut cursor = Some(start);
        while let Some(at) = cursor {
            match visit[at] {
                Visit::Done => break,
                Visit::OnPath => {
                    return Err(TransformError::CyclicHierarchy {
                        wbs_id: arena[at].id.to_string(),
                    })
                }
                Visit::New => {
                    visit[at] = Visit::OnPath;
                    path.push(at);
                    cursor = arena[at].parent;
                }
            }
        }
        while let Some(at) = path.pop() {
            let node = &arena[at];
            let entry = match node.parent {
                Some(p) => {
                    let (depth, parent_id) = &resolved[p];
                    (
                        depth + 1,
                        format!("{}{}{}", parent_id, STABLE_ID_SEPARATOR, node.name),
                    )
                }
                None => (1, node.name.to_string()),
            };
            resolved[at] = entry;
            visit[at] = Visit::Done;
        }
    }

    let mut hierarchy = Hierarchy::default();
    let mut seen = HashSet::with_capacity(arena.len());
    for (at, node) in arena.iter().enumerate() {
        let (depth, stable_id) = &resolved[at];
        hierarchy
            .stable_ids
            .insert(node.id.to_string(), stable_id.clone());

        let Some(parent) = node.parent else {
            hierarchy.roots.push(node.id.to_string());
            continue;
        };
        if !seen.insert(stable_id.as_str()) {
            warn!(stable_wbs_id = %stable_id, wbs_id = node.id, "stable id shared by sibling WBS nodes");
        }
        hierarchy.nodes.push(WbsHierarchyNode {
            stable_wbs_id: stable_id.clone(),
            wbs_id: node.id.to_string(),
            wbs_name: node.name.to_string(),
            level: depth - 2,
            parent_stable_wbs_id: arena[parent]
                .parent
                .map(|_| resolved[parent].1.clone()),
        });
    }

    if hierarchy.roots.len() > 1 {
        debug!(roots = ?hierarchy.roots, "WBS has several roots");
    }
    debug!(
        nodes = hierarchy.nodes.len(),
        roots = hierarchy.roots.len(),
        "hierarchy built"
    );
    Ok(hierarchy)
}
