//! Table extraction from published-HTML sheet exports.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::Table;

static WAFFLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.waffle").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static BG_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"background-image:\s*url\(['"]?(.*?)['"]?\)"#).unwrap());

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// What the row visually carries in a sheet export: text, an `<img>`, or a
/// cell styled with a background image. Rows with none of these are
/// spacer/chrome rows.
fn is_data_row(row: ElementRef) -> bool {
    if row.select(&CELL).next().is_none() {
        return false;
    }
    !element_text(row).is_empty()
        || row.select(&IMG).next().is_some()
        || row.html().contains("background-image")
}

fn cell_value(cell: ElementRef) -> String {
    if let Some(img) = cell.select(&IMG).next() {
        if let Some(src) = img.value().attr("src") {
            return src.to_string();
        }
    }
    if let Some(style) = cell.value().attr("style") {
        if let Some(m) = BG_IMAGE.captures(style) {
            return m.get(1).unwrap().as_str().to_string();
        }
    }
    element_text(cell)
}

/// Parses an HTML document and extracts the sheet's data table.
///
/// Prefers the canonical `.waffle` export table, falling back to whichever
/// table has the most rows. Needs a header row plus at least one data row,
/// otherwise the result is empty. Short rows are padded to header length.
pub fn parse_html(text: &str) -> Table {
    let doc = Html::parse_document(text);

    let table = doc
        .select(&WAFFLE)
        .next()
        .or_else(|| doc.select(&TABLE).max_by_key(|t| t.select(&TR).count()));

    let Some(table) = table else {
        return Table::default();
    };

    let rows: Vec<ElementRef> = table.select(&TR).filter(|r| is_data_row(*r)).collect();
    if rows.len() < 2 {
        return Table::default();
    }

    let headers: Vec<String> = rows[0]
        .select(&CELL)
        .map(|c| element_text(c).to_lowercase())
        .collect();

    let data = rows[1..]
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.select(&CELL).map(cell_value).collect();
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    Table { headers, rows: data }
}
