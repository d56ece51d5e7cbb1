use super::{LatLon, Value};

/// Customer registration, optionally with a position and an outage report.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewCustomer {
    pub name: String,
    pub location: String,
    pub meter_serial_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub report: Option<String>,
}

impl NewCustomer {
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into()),
            ("location", self.location.clone().into()),
            ("meter_serial_number", self.meter_serial_number.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            ("report", self.report.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub meter_serial_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub report: Option<String>,
}

impl Customer {
    pub fn position(&self) -> Option<LatLon> {
        LatLon::from_parts(self.latitude, self.longitude)
    }
}
