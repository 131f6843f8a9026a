//! Terminal presentation of a loaded itinerary. Read-only consumer of the
//! pipeline output.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::stop::{Itinerary, Stop};

fn render_entry(out: &mut String, stop: &Stop, number: usize, visited: bool) {
    let check = if visited { "[x]" } else { "[ ]" };
    let badge = if stop.stop_type.is_empty() {
        String::new()
    } else {
        format!("  [{}]", stop.stop_type.to_uppercase())
    };
    let _ = writeln!(out, "{check} {number:>2}. {}{badge}", stop.name);

    if !stop.short_info.is_empty() {
        let _ = writeln!(out, "       {}", stop.short_info);
    }
    if let Some(coords) = &stop.coords {
        let _ = writeln!(out, "       @ {}, {}", coords.lat, coords.lng);
    }
    if !stop.map_link.is_empty() {
        let _ = writeln!(out, "       {}", stop.map_link);
    }
    if stop.photos.len() > 1 {
        let _ = writeln!(out, "       ({} photos)", stop.photos.len());
    }
}

/// Renders the list view. Header stops become section dividers; the travel
/// annotation between entries only appears when no category filter is
/// active, since filtering breaks the itinerary's sequential reading.
pub fn render_list(
    itinerary: &Itinerary,
    filter: Option<&str>,
    visited: &BTreeMap<usize, bool>,
) -> String {
    let mut out = String::new();

    if !itinerary.categories.is_empty() {
        let _ = writeln!(
            out,
            "Categories: All | {}",
            itinerary.categories.join(" | ")
        );
        let _ = writeln!(out);
    }

    let mut number = 0;
    for stop in itinerary.stops.iter().filter(|s| s.matches_filter(filter)) {
        if stop.is_header {
            let _ = writeln!(out, "──── {} ────", stop.name.to_uppercase());
            continue;
        }

        if filter.is_none() && !stop.travel_text.is_empty() {
            let _ = writeln!(out, "     ↓ {}", stop.travel_text);
        }

        number += 1;
        render_entry(&mut out, stop, number, visited.get(&stop.id).copied().unwrap_or(false));
    }

    if number == 0 {
        let _ = writeln!(out, "No locations to show.");
    }

    out
}

pub fn render_json(itinerary: &Itinerary) -> Result<String> {
    Ok(serde_json::to_string_pretty(&itinerary.stops)?)
}
