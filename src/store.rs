// src/store.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::transform::EnrichedDocument;

const INDEX_FILE: &str = "projects.json";

/// One line of the project index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub project_id: String,
    pub saved_at: DateTime<Utc>,
    pub tables: usize,
    pub rows: usize,
}

/// Enriched exports as `<dir>/<project_id>.json`, plus a `projects.json`
/// index of every project saved so far.
pub struct ProjectStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles of the index file.
    index_lock: Mutex<()>,
}

impl ProjectStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating project store {:?}", dir))?;
        Ok(Self {
            dir,
            index_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `doc` and record it in the index, replacing any earlier save of
    /// the same project. Returns the document path.
    pub fn save(&self, doc: &EnrichedDocument) -> Result<PathBuf> {
        let path = self.document_path(&doc.project_id);
        write_json_atomic(&self.dir, &path, doc)
            .with_context(|| format!("saving project {}", doc.project_id))?;

        let _guard = self
            .index_lock
            .lock()
            .map_err(|_| anyhow!("project index lock poisoned"))?;
        let mut entries = self.list()?;
        entries.retain(|e| e.project_id != doc.project_id);
        entries.push(ProjectEntry {
            project_id: doc.project_id.clone(),
            saved_at: Utc::now(),
            tables: doc.document.len(),
            rows: doc.document.row_count(),
        });
        write_json_atomic(&self.dir, &self.dir.join(INDEX_FILE), &entries)
            .context("updating project index")?;

        info!(project_id = %doc.project_id, path = %path.display(), "project saved");
        Ok(path)
    }

    pub fn load(&self, project_id: &str) -> Result<EnrichedDocument> {
        let path = self.document_path(project_id);
        let file = File::open(&path)
            .with_context(|| format!("no stored project {} at {:?}", project_id, path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing stored project {:?}", path))
    }

    /// Every indexed project, oldest save first.
    pub fn list(&self) -> Result<Vec<ProjectEntry>> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no project index yet");
            return Ok(Vec::new());
        }
        let file = File::open(&path).with_context(|| format!("opening {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing project index {:?}", path))
    }

    fn document_path(&self, project_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(project_id)))
    }
}

/// Project ids come from the export. Every byte outside `[A-Za-z0-9._-]`
/// is percent-encoded, `%` included, so distinct ids never share a file.
fn file_stem(project_id: &str) -> String {
    let mut stem = String::with_capacity(project_id.len());
    for byte in project_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Write through a temp file in `dir` so readers never see a partial file.
fn write_json_atomic<T: Serialize + ?Sized>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    tmp.persist(path)?;
    Ok(())
}
