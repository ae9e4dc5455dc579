use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Sky position in degrees.
///
/// Only finiteness is checked. Range limits depend on the survey footprint
/// and are left to the remote services.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub ra: f64,
    pub dec: f64,
}

impl Coordinates {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RA {:.6}, Dec {:+.6}", self.ra, self.dec)
    }
}

/// Parse user-entered right ascension and declination.
pub fn parse_coordinates(ra: &str, dec: &str) -> PipelineResult<Coordinates> {
    Ok(Coordinates {
        ra: parse_degrees("ra", ra)?,
        dec: parse_degrees("dec", dec)?,
    })
}

fn parse_degrees(field: &str, value: &str) -> PipelineResult<f64> {
    let trimmed = value.trim();
    let parsed: f64 = trimmed.parse().map_err(|_| {
        PipelineError::Validation(format!("{}: '{}' is not a number", field, trimmed))
    })?;

    if !parsed.is_finite() {
        return Err(PipelineError::Validation(format!(
            "{}: '{}' is not a finite number",
            field, trimmed
        )));
    }

    Ok(parsed)
}

/// Resolve either a preset place or an explicit RA/Dec pair.
///
/// A place name wins over coordinates when both are given.
pub fn resolve_target(
    ra: Option<&str>,
    dec: Option<&str>,
    place: Option<&str>,
) -> PipelineResult<Coordinates> {
    if let Some(name) = place {
        return find_place(name)
            .map(|place| place.coordinates())
            .ok_or_else(|| PipelineError::Validation(format!("unknown place '{}'", name.trim())));
    }

    match (ra, dec) {
        (Some(ra), Some(dec)) => parse_coordinates(ra, dec),
        _ => Err(PipelineError::Validation(
            "both ra and dec are required".to_string(),
        )),
    }
}

/// A named field offered as a shortcut for typing coordinates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Place {
    pub name: &'static str,
    pub ra: f64,
    pub dec: f64,
}

impl Place {
    pub const fn new(name: &'static str, ra: f64, dec: f64) -> Self {
        Self { name, ra, dec }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.ra, self.dec)
    }
}

pub const PRESET_PLACES: &[Place] = &[
    Place::new("Stephans Quintet", 338.9896, 33.96),
    Place::new("M33 Galaxy", 23.4621, 30.6602),
    Place::new("M51 Galaxy", 202.469583, 47.195278),
    Place::new("M110 Galaxy", 10.0916, 41.6853),
    Place::new("Great Hercules Cluster", 250.423, 36.461),
    Place::new("Sombrero Galaxy", 187.706, 12.391),
    Place::new("Pleiades", 56.750, 24.117),
];

/// Case-insensitive lookup of a preset place.
pub fn find_place(name: &str) -> Option<&'static Place> {
    let wanted = name.trim();
    PRESET_PLACES
        .iter()
        .find(|place| place.name.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let coords = parse_coordinates("338.9896", "33.96").unwrap();
        assert_eq!(coords, Coordinates::new(338.9896, 33.96));
    }

    #[test]
    fn test_parse_trims_whitespace_and_accepts_negatives() {
        let coords = parse_coordinates("  10.5 ", "-11").unwrap();
        assert_eq!(coords.ra, 10.5);
        assert_eq!(coords.dec, -11.0);
    }

    #[test]
    fn test_out_of_range_is_not_rejected() {
        let coords = parse_coordinates("720", "-95").unwrap();
        assert_eq!(coords, Coordinates::new(720.0, -95.0));
    }

    #[test]
    fn test_non_numeric_rejected() {
        for (ra, dec) in [("abc", "10"), ("10", "north"), ("", "10"), ("1,5", "2")] {
            let err = parse_coordinates(ra, dec).unwrap_err();
            assert!(err.is_validation(), "{ra:?}/{dec:?} should fail validation");
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        for bad in ["NaN", "inf", "-infinity"] {
            let err = parse_coordinates(bad, "0").unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains("finite"));
        }
    }

    #[test]
    fn test_error_names_field() {
        let err = parse_coordinates("1", "x").unwrap_err();
        assert_eq!(err.to_string(), "Invalid coordinates. dec: 'x' is not a number");
    }

    #[test]
    fn test_find_place() {
        let place = find_place("stephans quintet").unwrap();
        assert_eq!(place.coordinates(), Coordinates::new(338.9896, 33.96));
        assert_eq!(find_place(" Pleiades ").unwrap().name, "Pleiades");
        assert!(find_place("Andromeda").is_none());
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target(None, None, Some("Pleiades")).unwrap(),
            Coordinates::new(56.750, 24.117)
        );
        assert_eq!(
            resolve_target(Some("1"), Some("2"), Some("m33 galaxy")).unwrap(),
            Coordinates::new(23.4621, 30.6602)
        );
        assert_eq!(
            resolve_target(Some("1"), Some("2"), None).unwrap(),
            Coordinates::new(1.0, 2.0)
        );
        assert!(resolve_target(Some("1"), None, None).unwrap_err().is_validation());
        assert_eq!(
            resolve_target(None, None, Some("Vulcan")).unwrap_err().to_string(),
            "Invalid coordinates. unknown place 'Vulcan'"
        );
    }

    #[test]
    fn test_display() {
        let coords = Coordinates::new(10.0916, 41.6853);
        assert_eq!(coords.to_string(), "RA 10.091600, Dec +41.685300");
    }
}
