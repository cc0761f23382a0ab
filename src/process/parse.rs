// src/process/parse.rs
use tracing::{debug, trace};

use crate::schema::{ExportHeader, ParsedDocument, Record, Table};

const TABLE_MARKER: &str = "%T";
const FIELDS_MARKER: &str = "%F";
const ROW_MARKER: &str = "%R";
const HEADER_MARKER: &str = "ERMHDR";

/// Scan state for one call of [`parse_xer`]; never shared between calls.
#[derive(Debug, Default)]
struct ParseState {
    /// Table named by the last `%T` line.
    current: Option<String>,
    /// Field names used to key the next `%R` rows.
    headers: Vec<String>,
}

/// Parse XER text into its tables.
///
/// - `%T <name>` starts (or restarts) a table and clears the current headers.
/// - `%F` sets the current table's field names, tab-separated.
/// - `%R` pushes one row keyed by the current field names; missing trailing
///   values become `""`, surplus values are dropped.
/// - `ERMHDR` before the first table is kept as the export header.
///
/// Anything else, including `%F`/`%R` lines without a table or fields, is
/// skipped. Never fails: malformed input yields fewer tables or rows.
pub fn parse_xer(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::new();
    let mut state = ParseState::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_start();

        if let Some(rest) = line.strip_prefix(TABLE_MARKER) {
            let name = rest.trim();
            if name.is_empty() {
                trace!(line = idx + 1, "table directive without a name");
                continue;
            }
            debug!(table = name, line = idx + 1, "table declared");
            doc.insert(name, Table::default());
            state.current = Some(name.to_string());
            state.headers.clear();
        } else if let Some(rest) = line.strip_prefix(FIELDS_MARKER) {
            let Some(table) = state.current.as_deref().and_then(|n| doc.get_mut(n)) else {
                trace!(line = idx + 1, "fields before any table");
                continue;
            };
            state.headers = rest
                .split('\t')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            table.headers = state.headers.clone();
        } else if let Some(rest) = line.strip_prefix(ROW_MARKER) {
            if state.headers.is_empty() {
                trace!(line = idx + 1, "row before fields");
                continue;
            }
            let Some(table) = state.current.as_deref().and_then(|n| doc.get_mut(n)) else {
                continue;
            };
            table.rows.push(split_row(rest, &state.headers));
        } else if let Some(rest) = line.strip_prefix(HEADER_MARKER) {
            if doc.header.is_none() && doc.is_empty() {
                doc.header = Some(ExportHeader::from_fields(rest.trim_end()));
            }
        }
    }

    for (name, table) in doc.iter() {
        debug!(table = name, rows = table.rows.len(), "table parsed");
    }
    doc
}

/// Pair `headers` positionally with the values of one `%R` line.
fn split_row(rest: &str, headers: &[String]) -> Record {
    // the first tab separates the marker from the values; an empty first
    // value must not shift the columns
    let rest = rest.strip_prefix('\t').unwrap_or_else(|| rest.trim_start());
    let mut values = rest.split('\t');
    headers
        .iter()
        .map(|h| (h.as_str(), values.next().map(str::trim).unwrap_or("")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,xerimport::process=trace")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    #[test]
    fn parses_headers_and_rows() {
        init_test_logging();
        let doc = parse_xer("%T\tT1\n%F\ta\tb\n%R\t1\t2\n%R\t3\t4\n");

        assert_eq!(doc.len(), 1);
        let table = doc.get("T1").expect("T1 parsed");
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].value("a"), "1");
        assert_eq!(table.rows[0].value("b"), "2");
        assert_eq!(table.rows[1].value("a"), "3");
        assert_eq!(table.rows[1].value("b"), "4");
    }

    #[test]
    fn short_rows_pad_with_empty_strings() {
        let doc = parse_xer("%T\tT\r\n%F\ta\tb\tc\r\n%R\t1\r\n%R\t1\t2\t3\t4\r\n");
        let table = doc.get("T").expect("T parsed");

        let first: Vec<_> = table.rows[0].fields().collect();
        assert_eq!(first, vec![("a", "1"), ("b", ""), ("c", "")]);
        // surplus values dropped
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[1].value("c"), "3");
    }

    #[test]
    fn empty_leading_value_keeps_column_positions() {
        let doc = parse_xer("%T\tT\n%F\ta\tb\n%R\t\tx\n");
        let row = &doc.get("T").expect("T parsed").rows[0];
        assert_eq!(row.value("a"), "");
        assert_eq!(row.value("b"), "x");
    }

    #[test]
    fn empty_input_gives_empty_document() {
        let doc = parse_xer("");
        assert!(doc.is_empty());
        assert!(doc.header.is_none());
    }

    #[test]
    fn directives_without_prerequisites_are_ignored() {
        let doc = parse_xer("%R\t1\n%F\ta\n%T\tT\n%R\t1\n\n  garbage\n%F\ta\n%R\t7\n");
        let table = doc.get("T").expect("T parsed");
        assert_eq!(table.headers, vec!["a"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].value("a"), "7");
    }

    #[test]
    fn redeclared_fields_apply_to_later_rows_only() {
        let doc = parse_xer("%T\tT\n%F\ta\tb\n%R\t1\t2\n%F\tc\n%R\t3\n");
        let table = doc.get("T").expect("T parsed");
        assert_eq!(table.headers, vec!["c"]);
        assert_eq!(table.rows[0].fields().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
        assert_eq!(table.rows[1].fields().collect::<Vec<_>>(), vec![("c", "3")]);
    }

    #[test]
    fn redeclared_table_is_overwritten_in_place() {
        let doc = parse_xer("%T\tA\n%F\tx\n%R\t1\n%T\tB\n%T\tA\n%F\ty\n%R\t2\n");
        assert_eq!(doc.table_names().collect::<Vec<_>>(), vec!["A", "B"]);
        let a = doc.get("A").expect("A parsed");
        assert_eq!(a.headers, vec!["y"]);
        assert_eq!(a.rows.len(), 1);
        assert_eq!(a.rows[0].value("y"), "2");
    }

    #[test]
    fn captures_export_header_and_ignores_end_marker() {
        let text = "ERMHDR\t20.12\t2024-01-15\tProject\tadmin\tAdmin\tdb\tProject Management\tEUR\n\
                    %T\tPROJECT\n%F\tproj_id\tproj_short_name\n%R\t42\tDEMO\n%E\n";
        let doc = parse_xer(text);
        let header = doc.header.as_ref().expect("header captured");
        assert_eq!(header.version, "20.12");
        assert_eq!(header.export_date, "2024-01-15");
        assert_eq!(header.currency, "EUR");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("PROJECT").map(|t| t.rows.len()), Some(1));
    }
}
