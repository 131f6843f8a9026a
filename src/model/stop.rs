use serde::{Deserialize, Serialize};

/// Decimal coordinates pulled out of a maps link.
///
/// Kept as the exact strings found in the link so the display matches what
/// the sheet author wrote.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Coords {
    pub lat: String,
    pub lng: String,
}

/// One itinerary entry, or a section-header pseudo-entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Stop {
    /// Assigned by ingestion order, stable for the lifetime of one load.
    pub id: usize,
    pub name: String,
    /// Raw location URL from the sheet. Also the navigation target.
    pub map_link: String,
    pub short_info: String,
    pub details: String,
    /// First photo, or empty when there are none.
    pub photo: String,
    pub photos: Vec<String>,
    /// Transit annotation shown between entries when no filter is active.
    pub travel_text: String,
    /// Free-text category label driving the filter chips.
    pub stop_type: String,
    pub coords: Option<Coords>,
    /// A row with a name but no usable map link. Rendered as a section
    /// divider, never plotted or matched against a category filter.
    pub is_header: bool,
}

impl Stop {
    pub fn matches_filter(&self, filter: Option<&str>) -> bool {
        match filter {
            None => true,
            Some(_) if self.is_header => false,
            Some(f) => self.stop_type == f,
        }
    }
}

/// Result of one full ingestion pass.
#[derive(Debug)]
pub struct Itinerary {
    pub stops: Vec<Stop>,
    /// Distinct category labels in first-seen order.
    pub categories: Vec<String>,
    /// Human-readable transport trace, one line per attempt.
    pub trace: Vec<String>,
}

impl Itinerary {
    /// Display name for the recent-plans list: first section header,
    /// falling back to the first stop.
    pub fn plan_name(&self) -> String {
        self.stops
            .iter()
            .find(|s| s.is_header)
            .or_else(|| self.stops.first())
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Unnamed Trip".to_string())
    }

    pub fn location_count(&self) -> usize {
        self.stops.iter().filter(|s| !s.is_header).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, stop_type: &str, is_header: bool) -> Stop {
        Stop {
            id: 0,
            name: name.to_string(),
            map_link: String::new(),
            short_info: String::new(),
            details: String::new(),
            photo: String::new(),
            photos: vec![],
            travel_text: String::new(),
            stop_type: stop_type.to_string(),
            coords: None,
            is_header,
        }
    }

    #[test]
    fn headers_never_match_an_active_filter() {
        let header = stop("Day 1", "", true);
        assert!(header.matches_filter(None));
        assert!(!header.matches_filter(Some("Food")));

        let entry = stop("Ramen place", "Food", false);
        assert!(entry.matches_filter(Some("Food")));
        assert!(!entry.matches_filter(Some("Sight")));
    }

    #[test]
    fn plan_name_prefers_the_first_header() {
        let it = Itinerary {
            stops: vec![stop("Eiffel Tower", "Sight", false), stop("Day 2", "", true)],
            categories: vec![],
            trace: vec![],
        };
        assert_eq!(it.plan_name(), "Day 2");
        assert_eq!(it.location_count(), 1);

        let empty = Itinerary { stops: vec![], categories: vec![], trace: vec![] };
        assert_eq!(empty.plan_name(), "Unnamed Trip");
    }
}
