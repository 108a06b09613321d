//! Due-row selection — the pure filter at the heart of every pass.
//!
//! Operates on header-keyed records exactly as they come off the sheet.
//! Data problems (bad dates, blank cells) exclude a row silently; they are
//! never errors. The same snapshot always selects the same rows.

use chrono::NaiveDate;

use aviso_core::dates::parse_day_first;
use aviso_core::types::{PendingRow, RawRow, SendMode, SENT_COLUMN, SENT_MARKER};

/// Date column labels seen across the deployed sheets, in precedence order.
pub const DATE_HEADER_ALIASES: [&str; 3] = ["Fecha", "Fecha (dd/mm/yy)", "Fecha(dd/mm/yy)"];

/// The raw date cell for a record: first alias with a non-empty value.
fn date_cell(row: &RawRow) -> Option<&str> {
    DATE_HEADER_ALIASES
        .iter()
        .find_map(|alias| row.get(*alias).map(String::as_str).filter(|v| !v.is_empty()))
}

fn field<'a>(row: &'a RawRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Select the rows due for dispatch.
///
/// `rows` must be in table order; positions are assigned top-down starting
/// at worksheet row 2 (row 1 is the header). A row is selected when its
/// sent flag is not the marker, its date parses, and the date matches
/// `mode` relative to `today`.
pub fn select_pending(rows: &[RawRow], mode: SendMode, today: NaiveDate) -> Vec<PendingRow> {
    let mut pending = Vec::new();

    for (offset, row) in rows.iter().enumerate() {
        let position = offset + 2;

        let sent = field(row, SENT_COLUMN).to_lowercase();
        if sent == SENT_MARKER {
            continue;
        }

        let Some(due) = date_cell(row).and_then(parse_day_first) else {
            continue;
        };

        let is_due = match mode {
            SendMode::Today => due == today,
            SendMode::UntilToday => due <= today,
        };
        if !is_due {
            continue;
        }

        pending.push(PendingRow {
            row: position,
            name: field(row, "Nombre").to_string(),
            role: field(row, "Cargo").to_string(),
            due,
        });
    }

    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()
    }

    #[test]
    fn test_sent_marker_excludes_row() {
        let rows = vec![
            record(&[("Nombre", "Ana"), ("Fecha", "03/04/2025"), ("Enviado", "sí")]),
            record(&[("Nombre", "Luis"), ("Fecha", "03/04/2025"), ("Enviado", "")]),
        ];
        let pending = select_pending(&rows, SendMode::Today, today());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "Luis");
        assert_eq!(pending[0].row, 3);
    }

    #[test]
    fn test_sent_marker_case_and_whitespace() {
        for marker in ["SÍ", "Sí", " sí ", "sÍ"] {
            let rows = vec![record(&[("Fecha", "03/04/2025"), ("Enviado", marker)])];
            assert!(
                select_pending(&rows, SendMode::Today, today()).is_empty(),
                "marker {marker:?} should exclude the row"
            );
        }
        // Unaccented "si" is a different word, the row stays pending.
        let rows = vec![record(&[("Fecha", "03/04/2025"), ("Enviado", "si")])];
        assert_eq!(select_pending(&rows, SendMode::Today, today()).len(), 1);
    }

    #[test]
    fn test_unparseable_date_excludes_row() {
        let rows = vec![
            record(&[("Nombre", "Ana"), ("Fecha", "")]),
            record(&[("Nombre", "Luis"), ("Fecha", "pronto")]),
            record(&[("Nombre", "Eva")]),
        ];
        assert!(select_pending(&rows, SendMode::UntilToday, today()).is_empty());
    }

    #[test]
    fn test_today_mode_exact_match_only() {
        let rows = vec![
            record(&[("Nombre", "ayer"), ("Fecha", "02/04/2025")]),
            record(&[("Nombre", "hoy"), ("Fecha", "03/04/2025")]),
            record(&[("Nombre", "mañana"), ("Fecha", "04/04/2025")]),
        ];
        let pending = select_pending(&rows, SendMode::Today, today());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "hoy");
    }

    #[test]
    fn test_until_today_includes_backlog() {
        let rows = vec![
            record(&[("Nombre", "ayer"), ("Fecha", "02/04/2025")]),
            record(&[("Nombre", "hoy"), ("Fecha", "03/04/2025")]),
            record(&[("Nombre", "mañana"), ("Fecha", "04/04/2025")]),
        ];
        let pending = select_pending(&rows, SendMode::UntilToday, today());
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].name, "ayer");
        assert_eq!(pending[1].name, "hoy");
    }

    #[test]
    fn test_positions_follow_table_order() {
        let rows = vec![
            record(&[("Fecha", "03/04/2025")]),
            record(&[("Fecha", "nunca")]),
            record(&[("Fecha", "03/04/2025")]),
        ];
        let pending = select_pending(&rows, SendMode::Today, today());
        let positions: Vec<usize> = pending.iter().map(|p| p.row).collect();
        assert_eq!(positions, vec![2, 4]);
    }

    #[test]
    fn test_date_header_aliases() {
        let rows = vec![
            record(&[("Fecha (dd/mm/yy)", "03/04/25")]),
            record(&[("Fecha(dd/mm/yy)", "03/04/25")]),
        ];
        let pending = select_pending(&rows, SendMode::Today, today());
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|p| p.due == today()));
    }

    #[test]
    fn test_empty_primary_alias_falls_through() {
        // An empty "Fecha" cell defers to the longer-labelled column.
        let rows = vec![record(&[
            ("Fecha", ""),
            ("Fecha (dd/mm/yy)", "03/04/2025"),
        ])];
        assert_eq!(select_pending(&rows, SendMode::Today, today()).len(), 1);
    }

    #[test]
    fn test_missing_name_and_role_become_empty() {
        let rows = vec![record(&[("Fecha", "03/04/2025")])];
        let pending = select_pending(&rows, SendMode::Today, today());
        assert_eq!(pending[0].name, "");
        assert_eq!(pending[0].role, "");
    }

    #[test]
    fn test_selection_is_pure() {
        let rows = vec![
            record(&[("Nombre", "Ana"), ("Fecha", "01/04/2025")]),
            record(&[("Nombre", "Luis"), ("Fecha", "03/04/2025"), ("Enviado", "sí")]),
        ];
        let first = select_pending(&rows, SendMode::UntilToday, today());
        let second = select_pending(&rows, SendMode::UntilToday, today());
        assert_eq!(first, second);
    }
}
