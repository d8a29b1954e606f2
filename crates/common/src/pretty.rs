//! Table-style rendering of decoded rows for diagnostics and test output.

use tabled::{builder::Builder, settings::Style};
use types::Value;

/// Render decoded rows under their column headers as an ASCII table.
///
/// # Example
///
/// ```
/// use common::pretty::render_table;
/// use types::Value;
///
/// let out = render_table(
///     &["id".into(), "name".into()],
///     &[vec![Value::Int(1), Value::Str("Ada".into())]],
/// );
/// assert!(out.contains("Ada"));
/// ```
pub fn render_table(columns: &[String], rows: &[Vec<Value>]) -> String {
    if columns.is_empty() && rows.is_empty() {
        return "<no rows>".into();
    }

    let mut builder = Builder::default();
    if !columns.is_empty() {
        builder.push_record(columns.iter().cloned());
    }
    for row in rows {
        builder.push_record(row.iter().map(format_value));
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// Format one value the way the table renderer does.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Str(s) => s.clone(),
        Value::Float(v) => v.to_string(),
        Value::Bool(b) => b.to_string(),
    }
}
