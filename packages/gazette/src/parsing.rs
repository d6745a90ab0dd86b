//! Parser for the search endpoint's semicolon export.
//!
//! The export is not CSV. It mixes banner lines (`Cantidad Documentos`,
//! `Pagina 3 de 10`, the column header) with data lines, uses `;` as the
//! delimiter, and never quotes or escapes a `;` inside the free-text
//! subject. A line is data only when it starts with a run of digits
//! immediately followed by `;`. Everything past the eighth column belongs
//! to the subject and is rejoined.
//!
//! A subject that itself wraps onto a new line starting with `digits;` is
//! indistinguishable from a data line. The export offers no way to tell the
//! two apart.

use std::sync::LazyLock;

use cgr_mirror_gazette_models::DocumentRow;
use regex::Regex;

/// Column delimiter.
const DELIMITER: &str = ";";

/// Index of the first column folded into `asunto`.
const ASUNTO_COLUMN: usize = 8;

static DATA_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+;").expect("valid regex"));

/// Returns whether `line` (already trimmed) is a data row.
#[must_use]
pub fn is_data_row(line: &str) -> bool {
    DATA_ROW.is_match(line)
}

/// Parses every data row out of a results page.
///
/// Blank lines, banners, headers, and lines with fewer than two columns are
/// dropped without error. An empty result means the page had no data.
#[must_use]
pub fn parse_rows(text: &str) -> Vec<DocumentRow> {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_data_row(line))
        .filter_map(parse_row)
        .collect()
}

/// Line boundaries: bare `\r` as well as `\n`, plus the vertical tab,
/// form feed, file/group/record separators, NEL, and the Unicode line and
/// paragraph separators. A `\r\n` pair leaves an empty line behind, which
/// [`parse_rows`] drops.
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Maps one data line onto a [`DocumentRow`].
///
/// Returns `None` when the line splits into fewer than two columns.
#[must_use]
pub fn parse_row(line: &str) -> Option<DocumentRow> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() < 2 {
        return None;
    }

    let column = |i: usize| parts.get(i).map_or_else(String::new, |s| s.trim().to_owned());

    let asunto = if parts.len() > ASUNTO_COLUMN {
        parts[ASUNTO_COLUMN..].join(DELIMITER).trim().to_owned()
    } else {
        String::new()
    };

    Some(DocumentRow {
        row_number: column(0),
        link: column(1),
        fecha_emision: column(2),
        fecha_publicacion: column(3),
        institucion: column(4),
        emite: column(5),
        tipo_documental: column(6),
        proceso: column(7),
        asunto,
    })
}
