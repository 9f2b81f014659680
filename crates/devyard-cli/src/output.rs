//! Formatted output helpers for CLI commands.
//!
//! Commands render into a `String` and print once, so rendering stays
//! testable.

use serde::Serialize;

use crate::commands::Format;

/// Left-aligned table with a header row, columns padded to their widest
/// cell.
#[must_use]
pub fn table<R: AsRef<[String]>>(headers: &[&str], rows: &[R]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.as_ref()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &widths, headers.iter().copied());
    for row in rows {
        push_row(&mut out, &widths, row.as_ref().iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Section title underlined to its own width.
#[must_use]
pub fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "\u{2550}".repeat(title.chars().count()))
}

/// One item per line, indented.
#[must_use]
pub fn list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("  {}\n", item.as_ref()))
        .collect()
}

/// Pretty JSON of `value`, newline-terminated.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Renders `value` as JSON, or with `text` in text mode.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render<T: Serialize>(
    format: Format,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        Format::Json => json(value),
        Format::Text => Ok(text(value)),
    }
}

/// Writes rendered output to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(rendered: &str) {
    print!("{rendered}");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn table_pads_to_widest_cell() {
        let rendered = table(
            &["NAME", "TYPE"],
            &[row(&["app1", "app"]), row(&["postgres-main", "service"])],
        );
        assert_eq!(
            rendered,
            "NAME           TYPE\napp1           app\npostgres-main  service\n"
        );
    }

    #[test]
    fn table_without_rows_prints_header() {
        let rendered = table::<Vec<String>>(&["IMAGE"], &[]);
        assert_eq!(rendered, "IMAGE\n");
    }

    #[test]
    fn heading_underlines_title() {
        assert_eq!(heading("Plan"), "Plan\n\u{2550}\u{2550}\u{2550}\u{2550}\n");
    }

    #[test]
    fn list_indents_items() {
        assert_eq!(list(["a", "b"]), "  a\n  b\n");
    }

    #[test]
    fn render_switches_on_format() {
        let value = vec!["x".to_string()];
        let text = render(Format::Text, &value, |v| v.join(",")).expect("text");
        assert_eq!(text, "x");
        let json = render(Format::Json, &value, |v| v.join(",")).expect("json");
        assert_eq!(json, "[\n  \"x\"\n]\n");
    }
}
