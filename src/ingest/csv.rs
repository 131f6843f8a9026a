//! Quoted-field delimited-text parser for sheet CSV exports.

use super::Table;

/// Parses CSV text into headers plus a row matrix.
///
/// A quote toggles quoted state unless doubled; a doubled quote inside a
/// quoted field emits a literal quote. Unquoted commas and newlines end
/// fields and rows. Cells are trimmed, headers lower-cased. Empty input
/// yields an empty table, not an error.
pub fn parse_csv(text: &str) -> Table {
    if text.is_empty() {
        return Table::default();
    }

    let clean = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut rows: Vec<Vec<String>> = vec![];
    let mut row: Vec<String> = vec![];
    let mut cell = String::new();
    let mut inside_quotes = false;

    let mut chars = clean.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if inside_quotes && chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            ',' if !inside_quotes => {
                row.push(cell.trim().to_string());
                cell.clear();
            }
            '\n' if !inside_quotes => {
                if !cell.is_empty() || !row.is_empty() {
                    row.push(cell.trim().to_string());
                    cell.clear();
                    rows.push(std::mem::take(&mut row));
                }
            }
            _ => cell.push(c),
        }
    }
    // Trailing partial row.
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell.trim().to_string());
        rows.push(row);
    }

    if rows.is_empty() {
        return Table::default();
    }

    let headers = rows
        .remove(0)
        .into_iter()
        .map(|h| h.to_lowercase().trim().to_string())
        .collect();

    Table { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_inside_quotes_stays_in_one_field() {
        let table = parse_csv("name,link\n\"Tokyo, Japan\",link1\n");
        assert_eq!(table.headers, vec!["name", "link"]);
        assert_eq!(table.rows, vec![vec!["Tokyo, Japan", "link1"]]);
    }

    #[test]
    fn doubled_quote_emits_a_literal_quote() {
        let table = parse_csv("a,b\n\"She said \"\"hi\"\"\",x\n");
        assert_eq!(table.rows, vec![vec!["She said \"hi\"", "x"]]);
    }

    #[test]
    fn quoted_newline_stays_in_one_cell() {
        let table = parse_csv("a,b\n\"line one\nline two\",x\n");
        assert_eq!(table.rows, vec![vec!["line one\nline two", "x"]]);
    }

    #[test]
    fn trailing_partial_row_is_flushed() {
        let table = parse_csv("a,b\n1,2");
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn crlf_and_cr_line_endings_are_normalized() {
        let table = parse_csv("a,b\r\n1,2\r3,4\r\n");
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn headers_are_lowercased_and_trimmed() {
        let table = parse_csv(" Name , Maps Link \nx,y\n");
        assert_eq!(table.headers, vec!["name", "maps link"]);
    }

    #[test]
    fn empty_input_yields_an_empty_table() {
        let table = parse_csv("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
