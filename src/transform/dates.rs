// src/transform/dates.rs
use crate::schema::Table;

/// Canonical task date fields and the alternate names older exports use for
/// them, in fallback order.
pub const TASK_DATE_FIELDS: &[(&str, &[&str])] = &[
    ("start_date", &["early_start_date", "restart_date"]),
    ("end_date", &["early_end_date", "reend_date"]),
    ("act_start_date", &["actual_start_date"]),
    ("act_end_date", &["actual_end_date"]),
    ("target_start_date", &["targ_start_date", "base_start_date"]),
    ("target_end_date", &["targ_end_date", "base_end_date"]),
];

/// Fill every canonical date field of every task row. A non-empty canonical
/// value wins, then the first non-empty variant, else `""`.
pub fn normalize_task_dates(task: &mut Table) {
    for (canonical, _) in TASK_DATE_FIELDS {
        task.ensure_header(canonical);
    }
    for row in &mut task.rows {
        for (canonical, variants) in TASK_DATE_FIELDS {
            if !row.value(canonical).is_empty() {
                continue;
            }
            let value = variants
                .iter()
                .map(|v| row.value(v))
                .find(|v| !v.is_empty())
                .unwrap_or("")
                .to_string();
            row.set(canonical, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;

    #[test]
    fn canonical_wins_then_variants_then_empty() {
        let mut task = Table::new(vec![
            "task_id".into(),
            "start_date".into(),
            "early_end_date".into(),
            "reend_date".into(),
        ]);
        let row: Record = [
            ("task_id", "1"),
            ("start_date", "2024-01-02 08:00"),
            ("early_start_date", "2023-12-31 08:00"),
            ("early_end_date", ""),
            ("reend_date", "2024-02-01 17:00"),
        ]
        .into_iter()
        .collect();
        task.rows.push(row);

        normalize_task_dates(&mut task);
        let row = &task.rows[0];
        assert_eq!(row.value("start_date"), "2024-01-02 08:00");
        assert_eq!(row.value("end_date"), "2024-02-01 17:00");
        assert_eq!(row.get("act_start_date"), Some(""));
        assert_eq!(row.get("target_end_date"), Some(""));
    }

    #[test]
    fn headers_added_once() {
        let mut task = Table::new(vec!["task_id".into()]);
        normalize_task_dates(&mut task);
        normalize_task_dates(&mut task);
        assert_eq!(task.headers.len(), 1 + TASK_DATE_FIELDS.len());
        assert_eq!(
            task.headers.iter().filter(|h| *h == "start_date").count(),
            1
        );
    }
}
