use std::{fmt, str::FromStr};

use super::{LatLon, Table, Value};
use crate::error::GridError;

/// The four point assets share one shape and differ only in table and
/// identifier column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetKind {
    Meter,
    Pole,
    Transformer,
    PowerStation,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] =
        [AssetKind::Meter, AssetKind::Pole, AssetKind::Transformer, AssetKind::PowerStation];

    pub fn table(self) -> Table {
        match self {
            Self::Meter => Table::Meters,
            Self::Pole => Table::Poles,
            Self::Transformer => Table::Transformers,
            Self::PowerStation => Table::PowerStations,
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            Self::Meter => "meter_id",
            Self::Pole => "pole_id",
            Self::Transformer => "transformer_id",
            Self::PowerStation => "station_id",
        }
    }

    pub fn from_table(table: Table) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.table() == table)
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Meter => "meter",
            Self::Pole => "pole",
            Self::Transformer => "transformer",
            Self::PowerStation => "power_station",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Meter => "Meter",
            Self::Pole => "Pole",
            Self::Transformer => "Transformer",
            Self::PowerStation => "Power Station",
        })
    }
}

/// Accepts the singular slug (`power_station`) or the table name
/// (`power_stations`).
impl FromStr for AssetKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == s || k.table().name() == s)
            .ok_or_else(|| GridError::InvalidTable(s.to_string()))
    }
}

/// Form submission for a meter, pole, transformer or power station.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct NewPointAsset {
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub external_id: String,
}

impl NewPointAsset {
    pub fn fields(&self, kind: AssetKind) -> Vec<(&'static str, Value)> {
        vec![
            ("location", self.location.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            (kind.id_column(), self.external_id.clone().into()),
        ]
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PointAssetRow {
    pub id: i64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub external_id: String,
}

impl PointAssetRow {
    pub(crate) fn into_asset(self, kind: AssetKind) -> PointAsset {
        PointAsset {
            kind,
            id: self.id,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            external_id: self.external_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PointAsset {
    pub kind: AssetKind,
    pub id: i64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub external_id: String,
}

impl PointAsset {
    pub fn position(&self) -> Option<LatLon> {
        LatLon::from_parts(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_slug_and_table_name() {
        assert_eq!("power_station".parse::<AssetKind>().unwrap(), AssetKind::PowerStation);
        assert_eq!("poles".parse::<AssetKind>().unwrap(), AssetKind::Pole);
        assert!("power_lines".parse::<AssetKind>().is_err());
    }

    #[test]
    fn fields_use_kind_specific_identifier_column() {
        let asset = NewPointAsset {
            location: "Thika Road".to_string(),
            latitude: -1.22,
            longitude: 36.88,
            external_id: "T-9".to_string(),
        };
        let fields = asset.fields(AssetKind::Transformer);
        assert_eq!(fields[3], ("transformer_id", Value::Text("T-9".to_string())));
    }
}
