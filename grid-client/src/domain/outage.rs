use std::fmt;

use super::{LatLon, Value};

/// Outage status. Not a state machine: any text is accepted and kept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum OutageStatus {
    Pending,
    Resolved,
    Other(String),
}

impl OutageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Resolved => "Resolved",
            Self::Other(s) => s,
        }
    }
}

impl Default for OutageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<String> for OutageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => Self::Pending,
            "Resolved" => Self::Resolved,
            _ => Self::Other(s),
        }
    }
}

impl From<OutageStatus> for String {
    fn from(s: OutageStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for OutageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct NewOutage {
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: OutageStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolution_time: Option<String>,
}

impl NewOutage {
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("location", self.location.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            ("status", self.status.as_str().into()),
            ("resolution_time", self.resolution_time.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutageRecord {
    pub id: i64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[sqlx(try_from = "String")]
    pub status: OutageStatus,
    pub resolution_time: Option<String>,
}

impl OutageRecord {
    pub fn position(&self) -> Option<LatLon> {
        LatLon::from_parts(self.latitude, self.longitude)
    }
}
