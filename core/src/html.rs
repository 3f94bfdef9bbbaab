//! HTML preview of grids

use crate::grid::{Cell, CellRow, Grid};
use std::fmt::Write;

/// Escape text for use in HTML content and double-quoted attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render one cell as `<td>` or `<th>`.
///
/// Cells with an IRI become links, error cells get the `table-danger`
/// class and comments become popover content.
#[must_use]
pub fn cell_to_html(cell: &Cell, header: bool) -> String {
    let label = escape_html(&cell.label);
    let content = match &cell.iri {
        Some(iri) => format!(r#"<a href="{}">{label}</a>"#, escape_html(iri)),
        None => label,
    };

    let mut attrs = String::new();
    if cell.is_error() {
        attrs.push_str(r#" class="table-danger""#);
    }
    if let Some(comment) = &cell.comment {
        let _ = write!(
            attrs,
            r#" data-toggle="popover" data-content="{}""#,
            escape_html(comment)
        );
    }

    let tag = if header { "th" } else { "td" };
    format!("<{tag}{attrs}>{content}</{tag}>")
}

fn push_rows(lines: &mut Vec<String>, section: &str, rows: &[CellRow], header: bool) {
    lines.push(format!("  <{section}>"));
    for row in rows {
        lines.push("    <tr>".to_string());
        for cell in row {
            lines.push(format!("      {}", cell_to_html(cell, header)));
        }
        lines.push("    </tr>".to_string());
    }
    lines.push(format!("  </{section}>"));
}

/// Render a grid as a `<table class="table">` element
#[must_use]
pub fn grid_to_html(grid: &Grid) -> String {
    let mut lines = vec![r#"<table class="table">"#.to_string()];
    if let Some(headers) = &grid.headers {
        push_rows(&mut lines, "thead", headers, true);
    }
    push_rows(&mut lines, "tbody", &grid.rows, false);
    lines.push("</table>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{error_cell, value_cell, value_cells};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_to_html() {
        assert_eq!(cell_to_html(&value_cell("a<b"), false), "<td>a&lt;b</td>");
        assert_eq!(cell_to_html(&value_cell("Name"), true), "<th>Name</th>");

        let cell = value_cell("ex:1").with_iri("http://example.com/1");
        assert_eq!(
            cell_to_html(&cell, false),
            r#"<td><a href="http://example.com/1">ex:1</a></td>"#
        );

        let cell = error_cell("IgZ", r#"'IgZ' is not a "term""#);
        assert_eq!(
            cell_to_html(&cell, false),
            r#"<td class="table-danger" data-toggle="popover" data-content="&#39;IgZ&#39; is not a &quot;term&quot;">IgZ</td>"#
        );
    }

    #[test]
    fn test_grid_to_html() {
        let grid = Grid::with_header(value_cells(["X"]), vec![value_cells(["5"])]);
        let expected = [
            r#"<table class="table">"#,
            "  <thead>",
            "    <tr>",
            "      <th>X</th>",
            "    </tr>",
            "  </thead>",
            "  <tbody>",
            "    <tr>",
            "      <td>5</td>",
            "    </tr>",
            "  </tbody>",
            "</table>",
        ]
        .join("\n");
        assert_eq!(grid_to_html(&grid), expected);
    }
}
