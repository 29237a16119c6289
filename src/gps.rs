//! GPS coordinate conversion
//!
//! EXIF stores latitude and longitude as degree/minute/second triples plus a
//! one-letter hemisphere reference. [`extract_coordinate`] turns a GPS table
//! into decimal degrees, or explains why it could not.
//!
//! No range validation is applied: minutes or seconds above 59 are summed
//! arithmetically as given.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::metadata::{GpsMetadata, TagValue};

pub const LATITUDE: &str = "GPSLatitude";
pub const LATITUDE_REF: &str = "GPSLatitudeRef";
pub const LONGITUDE: &str = "GPSLongitude";
pub const LONGITUDE_REF: &str = "GPSLongitudeRef";

/// Why a GPS block did not yield a coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GpsError {
    #[error("{0} is missing")]
    Missing(&'static str),

    #[error("{tag} is malformed: {reason}")]
    Malformed { tag: &'static str, reason: String },
}

/// Hemisphere reference letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// South and West count negative
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }
}

impl FromStr for Hemisphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => Ok(Hemisphere::North),
            "S" => Ok(Hemisphere::South),
            "E" => Ok(Hemisphere::East),
            "W" => Ok(Hemisphere::West),
            other => Err(format!("unknown hemisphere reference {:?}", other)),
        }
    }
}

/// Decimal-degree location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// `degrees + minutes/60 + seconds/3600`, negated for South and West
pub fn dms_to_decimal(dms: [f64; 3], reference: Hemisphere) -> f64 {
    let [degrees, minutes, seconds] = dms;
    reference.sign() * (degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Extract latitude and longitude from a GPS table
///
/// All four components must be present and well-formed.
pub fn extract_coordinate(gps: &GpsMetadata) -> Result<Coordinate, GpsError> {
    let lat = dms_triple(gps, LATITUDE)?;
    let lat_ref = hemisphere(gps, LATITUDE_REF)?;
    let lon = dms_triple(gps, LONGITUDE)?;
    let lon_ref = hemisphere(gps, LONGITUDE_REF)?;

    Ok(Coordinate {
        latitude: dms_to_decimal(lat, lat_ref),
        longitude: dms_to_decimal(lon, lon_ref),
    })
}

fn dms_triple(gps: &GpsMetadata, tag: &'static str) -> Result<[f64; 3], GpsError> {
    let value = gps.get(tag).ok_or(GpsError::Missing(tag))?;
    let malformed = |reason: String| GpsError::Malformed { tag, reason };

    let numbers: Vec<f64> = match value {
        TagValue::Rational(v) => v.iter()
            .map(|r| r.to_f64().ok_or_else(|| malformed(format!("zero denominator in {}", r))))
            .collect::<Result<_, _>>()?,
        TagValue::Unsigned(v) => v.iter().map(|&x| x as f64).collect(),
        TagValue::Signed(v) => v.iter().map(|&x| x as f64).collect(),
        TagValue::Float(v) => v.clone(),
        other => return Err(malformed(format!("expected numbers, got {:?}", other))),
    };

    if numbers.iter().any(|v| !v.is_finite()) {
        return Err(malformed("non-finite component".to_string()));
    }

    match numbers.as_slice() {
        &[d, m, s] => Ok([d, m, s]),
        _ => Err(malformed(format!("expected 3 components, got {}", numbers.len()))),
    }
}

fn hemisphere(gps: &GpsMetadata, tag: &'static str) -> Result<Hemisphere, GpsError> {
    let value = gps.get(tag).ok_or(GpsError::Missing(tag))?;
    let text = value.as_text().ok_or_else(|| GpsError::Malformed {
        tag,
        reason: format!("expected text, got {:?}", value),
    })?;
    text.parse().map_err(|reason| GpsError::Malformed { tag, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Rational;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn rational_triple(d: i64, m: i64, s: i64) -> TagValue {
        TagValue::Rational(vec![Rational::new(d, 1), Rational::new(m, 1), Rational::new(s, 1)])
    }

    fn pittsburgh() -> GpsMetadata {
        let mut gps = GpsMetadata::new();
        gps.insert(LATITUDE.into(), rational_triple(40, 26, 46));
        gps.insert(LATITUDE_REF.into(), TagValue::Text("N".into()));
        gps.insert(LONGITUDE.into(), rational_triple(79, 58, 56));
        gps.insert(LONGITUDE_REF.into(), TagValue::Text("W".into()));
        gps
    }

    #[test]
    fn test_north_east_positive() {
        for r in [Hemisphere::North, Hemisphere::East] {
            let v = dms_to_decimal([12.0, 30.0, 36.0], r);
            assert!(approx(v, 12.0 + 30.0 / 60.0 + 36.0 / 3600.0));
        }
    }

    #[test]
    fn test_south_west_negative() {
        for r in [Hemisphere::South, Hemisphere::West] {
            let v = dms_to_decimal([12.0, 30.0, 36.0], r);
            assert!(approx(v, -(12.0 + 30.0 / 60.0 + 36.0 / 3600.0)));
        }
    }

    #[test]
    fn test_known_values() {
        assert!(approx(dms_to_decimal([40.0, 26.0, 46.0], Hemisphere::North), 40.446111));
        assert!(approx(dms_to_decimal([79.0, 58.0, 56.0], Hemisphere::West), -79.982222));
    }

    #[test]
    fn test_out_of_range_minutes_are_accepted() {
        let v = dms_to_decimal([10.0, 90.0, 0.0], Hemisphere::North);
        assert!(approx(v, 11.5));
    }

    #[test]
    fn test_hemisphere_parsing() {
        assert_eq!("N".parse::<Hemisphere>(), Ok(Hemisphere::North));
        assert_eq!(" W ".parse::<Hemisphere>(), Ok(Hemisphere::West));
        assert!("X".parse::<Hemisphere>().is_err());
        assert!("".parse::<Hemisphere>().is_err());
    }

    #[test]
    fn test_extract_complete_block() {
        let coord = extract_coordinate(&pittsburgh()).unwrap();
        assert!(approx(coord.latitude, 40.446111));
        assert!(approx(coord.longitude, -79.982222));
    }

    #[test]
    fn test_missing_longitude_ref() {
        let mut gps = pittsburgh();
        gps.remove(LONGITUDE_REF);
        assert_eq!(extract_coordinate(&gps), Err(GpsError::Missing(LONGITUDE_REF)));
    }

    #[test]
    fn test_zero_denominator_is_malformed() {
        let mut gps = pittsburgh();
        gps.insert(
            LATITUDE.into(),
            TagValue::Rational(vec![Rational::new(40, 0), Rational::new(0, 1), Rational::new(0, 1)]),
        );
        assert!(matches!(
            extract_coordinate(&gps),
            Err(GpsError::Malformed { tag: LATITUDE, .. })
        ));
    }

    #[test]
    fn test_non_finite_float_is_malformed() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut gps = pittsburgh();
            gps.insert(LATITUDE.into(), TagValue::Float(vec![bad, 0.0, 0.0]));
            assert_eq!(
                extract_coordinate(&gps),
                Err(GpsError::Malformed { tag: LATITUDE, reason: "non-finite component".into() })
            );
        }
    }

    #[test]
    fn test_short_triple_is_malformed() {
        let mut gps = pittsburgh();
        gps.insert(LONGITUDE.into(), TagValue::Rational(vec![Rational::new(79, 1)]));
        assert!(matches!(
            extract_coordinate(&gps),
            Err(GpsError::Malformed { tag: LONGITUDE, .. })
        ));
    }

    #[test]
    fn test_zero_coordinate_is_still_found() {
        let mut gps = pittsburgh();
        gps.insert(LATITUDE.into(), rational_triple(0, 0, 0));
        let coord = extract_coordinate(&gps).unwrap();
        assert_eq!(coord.latitude, 0.0);
    }
}
