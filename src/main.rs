use anyhow::Result;
use rayon::prelude::*;
use std::{env, path::PathBuf, process::exit, time::Instant};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use xerimport::{process_xer_path, Config, ProjectStore};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,xerimport=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) args + config ────────────────────────────────────────────
    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("Usage: xerimport <FILE.xer>...");
        exit(1);
    }
    let config = Config::from_env()?;
    let store = ProjectStore::open(&config.output_dir)?;
    info!(files = paths.len(), out = %store.dir().display(), "startup");

    // ─── 3) process + save each export in parallel ──────────────────
    let start = Instant::now();
    let failures: usize = paths
        .par_iter()
        .map(|path| {
            let started = Instant::now();
            let outcome = process_xer_path(path, &config.transform)
                .and_then(|doc| store.save(&doc).map(|saved| (doc, saved)));
            match outcome {
                Ok((doc, saved)) => {
                    info!(
                        file = %path.display(),
                        project_id = %doc.project_id,
                        wbs_nodes = doc.hierarchy().len(),
                        saved = %saved.display(),
                        elapsed = ?started.elapsed(),
                        "imported"
                    );
                    0
                }
                Err(e) => {
                    error!(file = %path.display(), "import failed: {:#}", e);
                    1
                }
            }
        })
        .sum();

    info!(elapsed = ?start.elapsed(), failures, "all done");
    if failures > 0 {
        anyhow::bail!("{} of {} files failed to import", failures, paths.len());
    }
    Ok(())
}
