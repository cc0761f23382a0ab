use anyhow::{Context, Result};
use std::{env, fs, process::exit};
use xerimport::{parse_xer, ExportHeader};

fn main() -> Result<()> {
    // Expect a single argument: path to the XER file
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <FILE.xer>", args[0]);
        exit(1);
    }
    let path = &args[1];

    let bytes = fs::read(path).with_context(|| format!("reading {}", path))?;
    let doc = parse_xer(&String::from_utf8_lossy(&bytes));

    if let Some(header) = &doc.header {
        println!("{}", describe_header(header));
    }
    println!("{:<24} {:>8} {:>8}", "table", "fields", "rows");
    for (name, table) in doc.iter() {
        println!("{:<24} {:>8} {:>8}", name, table.headers.len(), table.rows.len());
    }
    println!("{} tables, {} rows", doc.len(), doc.row_count());
    Ok(())
}

/// Summary line for the `ERMHDR` header; a date that does not parse is shown
/// raw and flagged.
fn describe_header(header: &ExportHeader) -> String {
    let date = match header.export_day() {
        Some(day) => day.format("%d %b %Y").to_string(),
        None => format!("{:?} (unparsed date)", header.export_date),
    };
    format!(
        "P6 {} export, {} by {} ({})",
        header.version, date, header.user, header.currency
    )
}
