//! Coordinate normalization.
//!
//! Reports write coordinates as free text, usually `(lat, lng)`.  When the
//! text parses cleanly it is replaced with structured [`Coordinates`];
//! otherwise the raw string is kept as-is.

use report_ner_report_models::{COORDINATES, Coordinates, ExtractionResult, FieldValue};

/// Parses `"(lat, lng)"` (parentheses optional) into coordinates.
///
/// Returns `None` unless the text splits on commas into exactly two
/// finite numbers. `NaN` and infinities are rejected because JSON cannot
/// represent them and they would be written as `null`.
#[must_use]
pub fn parse_coordinates(raw: &str) -> Option<Coordinates> {
    let cleaned = raw.replace(['(', ')'], "");
    let mut parts = cleaned.split(',');

    let lat = parts.next()?;
    let lng = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let latitude = lat.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let longitude = lng.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// Replaces a textual `coordinates` field with structured coordinates when
/// it parses. Does nothing if the field is absent, already structured, or
/// malformed.
pub fn normalize_coordinates(result: &mut ExtractionResult) {
    let Some(FieldValue::Text(raw)) = result.get(COORDINATES) else {
        return;
    };

    match parse_coordinates(raw) {
        Some(coordinates) => {
            result.insert(COORDINATES, coordinates);
        }
        None => log::trace!("Keeping unparseable coordinates {raw:?} as text"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parenthesized_pair() {
        let c = parse_coordinates("(12.34, -56.78)").unwrap();
        assert!((c.latitude - 12.34).abs() < f64::EPSILON);
        assert!((c.longitude - -56.78).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_bare_pair() {
        let c = parse_coordinates("38.9,-77.03").unwrap();
        assert!((c.latitude - 38.9).abs() < f64::EPSILON);
        assert!((c.longitude - -77.03).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(parse_coordinates("unknown").is_none());
        assert!(parse_coordinates("(1.0, 2.0, 3.0)").is_none());
        assert!(parse_coordinates("").is_none());
    }

    #[test]
    fn rejects_non_numeric_parts() {
        assert!(parse_coordinates("(north, 2.0)").is_none());
        assert!(parse_coordinates("(1.0, )").is_none());
        assert!(parse_coordinates("(NaN, 2.0)").is_none());
        assert!(parse_coordinates("(1.0, inf)").is_none());
    }

    #[test]
    fn normalizes_in_place() {
        let mut result = ExtractionResult::new();
        result.insert("report_number", "1");
        result.insert(COORDINATES, "(37.77, -122.41)");
        result.insert("police_district", "Central");

        normalize_coordinates(&mut result);

        let c = result.get(COORDINATES).unwrap().as_coordinates().unwrap();
        assert!((c.latitude - 37.77).abs() < f64::EPSILON);
        assert!((c.longitude - -122.41).abs() < f64::EPSILON);
        let keys: Vec<&str> = result.keys().collect();
        assert_eq!(keys, vec!["report_number", COORDINATES, "police_district"]);
    }

    #[test]
    fn keeps_malformed_text() {
        let mut result = ExtractionResult::new();
        result.insert(COORDINATES, "unknown");

        normalize_coordinates(&mut result);

        assert_eq!(result.get_text(COORDINATES), Some("unknown"));
    }

    #[test]
    fn absent_field_stays_absent() {
        let mut result = ExtractionResult::new();
        normalize_coordinates(&mut result);
        assert!(result.is_empty());
    }
}
