//! Rewrites user-supplied sheet links into export-formatted request URLs.
//!
//! Pure string transforms, no network access. `process_url` is idempotent:
//! normalizing an already-normalized URL returns the same URL.

use regex::Regex;
use std::sync::LazyLock;

static SPREADSHEET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9-_]+)").unwrap());
static EDIT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/edit.*$").unwrap());

fn csv_export_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv&gid=0")
}

/// Turns a sheet link into the URL that actually gets requested.
///
/// Links that already carry a CSV export marker pass through untouched.
/// `force_csv` bypasses the published-HTML path and always requests the
/// first sheet as CSV.
pub fn process_url(url: &str, force_csv: bool) -> String {
    let clean = url.trim();
    if clean.is_empty() {
        return String::new();
    }

    if clean.contains("output=csv") || clean.contains("format=csv") {
        return clean.to_string();
    }

    let id = SPREADSHEET_ID
        .captures(clean)
        .map(|c| c.get(1).unwrap().as_str());

    if force_csv {
        if let Some(id) = id {
            return csv_export_url(id);
        }
        if clean.contains("/pubhtml") {
            return clean.replace("/pubhtml", "/export?format=csv&gid=0");
        }
    }

    if clean.contains("/edit") {
        return EDIT_SUFFIX
            .replace(clean, "/export?format=csv&gid=0")
            .into_owned();
    }

    // Published HTML is fetched as-is, just pinned to the first sheet.
    if clean.contains("/pubhtml") {
        if clean.contains("single=") {
            return clean.to_string();
        }
        let sep = if clean.contains('?') { '&' } else { '?' };
        return format!("{clean}{sep}gid=0&single=true");
    }

    // Bare spreadsheet URL with no recognizable suffix.
    if let Some(id) = id {
        return csv_export_url(id);
    }

    clean.to_string()
}

/// Alternate export form tried when the primary one answers with an
/// authentication page.
pub fn publish_url(url: &str) -> String {
    EDIT_SUFFIX
        .replace(url.trim(), "/pub?output=csv&gid=0")
        .into_owned()
}

/// Encodes a sheet link as a `sheet=` query parameter on the share base.
pub fn deep_link(base: &str, sheet_url: &str) -> String {
    let base = base.trim_end_matches('?');
    format!("{base}?sheet={}", urlencoding::encode(sheet_url))
}

/// Pulls the sheet link back out of a deep link. Returns `None` when the
/// input has no `sheet=` parameter, so raw sheet links fall through.
pub fn extract_deep_link(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == "sheet" {
            urlencoding::decode(value).ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}
