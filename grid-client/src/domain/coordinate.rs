use crate::error::GridError;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Builds a position from optional stored values; `None` unless both
    /// are present, finite and in range.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        let (lat, lon) = (lat?, lon?);
        (in_range(lat, LATITUDE_RANGE) && in_range(lon, LONGITUDE_RANGE)).then_some(Self { lat, lon })
    }
}

fn in_range(v: f64, (min, max): (f64, f64)) -> bool {
    v.is_finite() && v >= min && v <= max
}

fn check(field: &str, value: f64, (min, max): (f64, f64)) -> Result<(), GridError> {
    if in_range(value, (min, max)) {
        Ok(())
    } else {
        Err(GridError::InvalidCoordinate { field: field.to_string(), value, min, max })
    }
}

pub fn check_latitude(field: &str, value: f64) -> Result<(), GridError> {
    check(field, value, LATITUDE_RANGE)
}

pub fn check_longitude(field: &str, value: f64) -> Result<(), GridError> {
    check(field, value, LONGITUDE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(check_latitude("latitude", -90.0).is_ok());
        assert!(check_longitude("longitude", 180.0).is_ok());
        assert!(check_latitude("latitude", 90.0001).is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let err = check_longitude("end_longitude", f64::NAN).unwrap_err();
        assert!(matches!(err, GridError::InvalidCoordinate { ref field, .. } if field == "end_longitude"));
    }

    #[test]
    fn from_parts_needs_both_values() {
        assert_eq!(
            LatLon::from_parts(Some(-1.2864), Some(36.8172)),
            Some(LatLon { lat: -1.2864, lon: 36.8172 })
        );
        assert_eq!(LatLon::from_parts(Some(-1.2864), None), None);
        assert_eq!(LatLon::from_parts(Some(120.0), Some(36.0)), None);
    }
}
