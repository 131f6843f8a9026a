//! Maps loosely-named sheet headers to semantic fields.

use super::LoadError;

/// Index of each semantic field in the row matrix, `None` when no header
/// matched.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub link: Option<usize>,
    pub short: Option<usize>,
    pub details: Option<usize>,
    pub photo: Option<usize>,
    pub travel: Option<usize>,
    pub stop_type: Option<usize>,
}

fn find(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| needles.iter().any(|n| h.contains(n)))
}

/// Resolves semantic fields by substring match against lower-cased headers,
/// first match wins. The match order is load-bearing: sheets in the wild
/// rely on it, so the substring sets must not be reordered or "improved".
///
/// Fails when neither a name nor a link column can be found, at which point
/// the document is not recognizable as an itinerary.
pub fn infer_columns(headers: &[String]) -> Result<ColumnMap, LoadError> {
    let map = ColumnMap {
        name: find(headers, &["name", "place", "location"]),
        link: find(headers, &["link", "map", "url"]),
        short: find(headers, &["short", "hover", "summary"]),
        details: find(headers, &["detail", "desc", "info"]),
        photo: find(headers, &["photo", "img", "pic"]),
        travel: find(headers, &["travel", "distance", "time", "duration"]),
        stop_type: find(headers, &["type", "category", "tag"]),
    };

    if map.name.is_none() && map.link.is_none() {
        return Err(LoadError::MissingRequiredColumns);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn loose_substrings_resolve_in_order() {
        let map = infer_columns(&headers(&["place", "map url", "photo pics"])).unwrap();
        assert_eq!(map.name, Some(0));
        assert_eq!(map.link, Some(1));
        assert_eq!(map.photo, Some(2));
        assert_eq!(map.short, None);
        assert_eq!(map.details, None);
        assert_eq!(map.travel, None);
        assert_eq!(map.stop_type, None);
    }

    #[test]
    fn first_match_wins() {
        // "location name" matches name before "place" does.
        let map = infer_columns(&headers(&["location name", "place", "maps link"])).unwrap();
        assert_eq!(map.name, Some(0));
        assert_eq!(map.link, Some(2));
    }

    #[test]
    fn one_of_name_or_link_is_enough() {
        assert!(infer_columns(&headers(&["maps link"])).is_ok());
        assert!(infer_columns(&headers(&["place"])).is_ok());
    }

    #[test]
    fn missing_both_required_columns_fails() {
        let err = infer_columns(&headers(&["notes", "stuff"])).unwrap_err();
        assert!(matches!(err, LoadError::MissingRequiredColumns));
    }
}
