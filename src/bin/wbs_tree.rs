use anyhow::Result;
use std::{env, process::exit};
use tracing_subscriber::{fmt, EnvFilter};
use xerimport::{process_xer_path, TransformOptions};

/// Print the stable WBS hierarchy of one export as an indented tree.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <FILE.xer>", args[0]);
        exit(1);
    }

    let doc = process_xer_path(&args[1], &TransformOptions::default())?;
    println!("project {}", doc.project_id);
    for node in doc.hierarchy() {
        println!("{}{}  [{}]", "  ".repeat(node.level + 1), node.wbs_name, node.stable_wbs_id);
    }
    Ok(())
}
