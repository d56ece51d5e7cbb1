use super::{LatLon, Value};

/// Form submission for a power line: two named endpoints, no intermediate
/// vertices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct NewPowerLine {
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_location: String,
    pub start_latitude: f64,
    pub start_longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_location: String,
    pub end_latitude: f64,
    pub end_longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub line_id: String,
}

impl NewPowerLine {
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("start_location", self.start_location.clone().into()),
            ("start_latitude", self.start_latitude.into()),
            ("start_longitude", self.start_longitude.into()),
            ("end_location", self.end_location.clone().into()),
            ("end_latitude", self.end_latitude.into()),
            ("end_longitude", self.end_longitude.into()),
            ("line_id", self.line_id.clone().into()),
        ]
    }
}

/// Stored power line. Coordinates may be missing for imported rows.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PowerLine {
    pub id: i64,
    pub start_location: String,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_location: String,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub line_id: String,
}

impl PowerLine {
    /// Both endpoints, or `None` when any of the four coordinates is
    /// missing or unusable.
    pub fn endpoints(&self) -> Option<(LatLon, LatLon)> {
        let start = LatLon::from_parts(self.start_latitude, self.start_longitude)?;
        let end = LatLon::from_parts(self.end_latitude, self.end_longitude)?;
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(end_latitude: Option<f64>) -> PowerLine {
        PowerLine {
            id: 1,
            start_location: "Kiambere".to_string(),
            start_latitude: Some(-0.64),
            start_longitude: Some(37.89),
            end_location: "Embakasi".to_string(),
            end_latitude,
            end_longitude: Some(36.9),
            line_id: "L-220".to_string(),
        }
    }

    #[test]
    fn endpoints_present_when_all_four_coordinates_are() {
        let (start, end) = line(Some(-1.32)).endpoints().unwrap();
        assert_eq!(start, LatLon { lat: -0.64, lon: 37.89 });
        assert_eq!(end, LatLon { lat: -1.32, lon: 36.9 });
    }

    #[test]
    fn missing_end_latitude_drops_endpoints() {
        assert!(line(None).endpoints().is_none());
    }
}
