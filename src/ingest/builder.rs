//! Converts raw rows into typed stops.

use itertools::Itertools;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use super::{columns::ColumnMap, LoadError};
use crate::model::stop::{Coords, Stop};

static AT_COORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").unwrap());
static SEARCH_COORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"search/(-?\d+\.\d+),\+?(-?\d+\.\d+)").unwrap());
static DRIVE_PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9-_]+)").unwrap());
static DRIVE_PARAM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=([a-zA-Z0-9-_]+)").unwrap());
static POSTIMG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"postimg\.cc/([a-zA-Z0-9]+)").unwrap());

/// Opportunistic coordinate extraction from a maps link. The `@lat,lng`
/// form wins over the `/search/lat,+lng` form; neither matching is fine.
pub fn extract_coords(url: &str) -> Option<Coords> {
    AT_COORDS
        .captures(url)
        .or_else(|| SEARCH_COORDS.captures(url))
        .map(|c| Coords {
            lat: c.get(1).unwrap().as_str().to_string(),
            lng: c.get(2).unwrap().as_str().to_string(),
        })
}

/// Rewrites consumer photo-sharing links to directly fetchable image URLs.
/// Unrecognized URLs pass through trimmed.
pub fn fix_image_link(url: &str) -> String {
    let url = url.trim();

    if url.contains("drive.google.com") {
        if let Some(c) = DRIVE_PATH_ID
            .captures(url)
            .or_else(|| DRIVE_PARAM_ID.captures(url))
        {
            return format!(
                "https://drive.google.com/uc?export=view&id={}",
                c.get(1).unwrap().as_str()
            );
        }
    }

    if url.contains("photos.app.goo.gl") {
        return url.to_string();
    }

    // postimg.cc sharing pages point at an HTML page; the direct image
    // lives on the i.postimg.cc subdomain.
    if url.contains("postimg.cc") && !url.contains("i.postimg.cc") {
        if let Some(c) = POSTIMG_TOKEN.captures(url) {
            return format!("https://i.postimg.cc/{}/image.jpg", c.get(1).unwrap().as_str());
        }
    }

    url.to_string()
}

fn strip_markup(name: &str) -> String {
    if !name.contains('<') {
        return name.to_string();
    }
    let fragment = Html::parse_fragment(name);
    fragment.root_element().text().collect::<String>().trim().to_string()
}

fn field<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// Builds the stop list from the raw row matrix.
///
/// Rows survive only as section headers (name but no usable link) or as
/// entries whose link is longer than 5 characters; everything else is
/// dropped. Returns the stops plus the distinct category labels in
/// first-seen order.
pub fn build_stops(
    rows: &[Vec<String>],
    columns: &ColumnMap,
) -> Result<(Vec<Stop>, Vec<String>), LoadError> {
    let mut categories: Vec<String> = vec![];

    let stops = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let link = field(row, columns.link);
            let name = field(row, columns.name);
            let is_header = !name.is_empty() && (link.is_empty() || link.len() < 5);
            let coords = extract_coords(link);

            let mut display_name = strip_markup(name);
            if display_name.is_empty() {
                if coords.is_some() {
                    display_name = format!("Location {}", idx + 1);
                } else if !is_header {
                    display_name = "Unnamed Location".to_string();
                }
            }

            let photos = field(row, columns.photo)
                .split(',')
                .map(|p| fix_image_link(p.trim()))
                .filter(|p| p.len() > 5)
                .collect_vec();

            let stop_type = field(row, columns.stop_type).to_string();
            if !stop_type.is_empty() && !categories.contains(&stop_type) {
                categories.push(stop_type.clone());
            }

            Stop {
                id: idx,
                name: display_name,
                map_link: link.to_string(),
                short_info: field(row, columns.short).to_string(),
                details: field(row, columns.details).to_string(),
                photo: photos.first().cloned().unwrap_or_default(),
                photos,
                travel_text: field(row, columns.travel).to_string(),
                stop_type,
                coords,
                is_header,
            }
        })
        .filter(|stop| stop.is_header || stop.map_link.len() > 5)
        .collect_vec();

    if stops.is_empty() {
        return Err(LoadError::NoValidLocations);
    }

    Ok((stops, categories))
}
