use std::{fmt, str::FromStr};

use crate::error::GridError;

/// Storage class of a catalogue column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Real,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Real => "REAL",
        }
    }
}

/// One non-id column of a table.
///
/// `required` columns must be present in an import header. Values of real
/// columns may still be NULL in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

const fn text(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Text, required: true }
}

const fn opt_text(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Text, required: false }
}

const fn real(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Real, required: true }
}

const fn opt_real(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Real, required: false }
}

const CUSTOMERS: &[Column] = &[
    text("name"),
    text("location"),
    opt_text("meter_serial_number"),
    opt_real("latitude"),
    opt_real("longitude"),
    opt_text("report"),
];

const METERS: &[Column] = &[text("location"), real("latitude"), real("longitude"), text("meter_id")];
const POLES: &[Column] = &[text("location"), real("latitude"), real("longitude"), text("pole_id")];
const TRANSFORMERS: &[Column] =
    &[text("location"), real("latitude"), real("longitude"), text("transformer_id")];
const POWER_STATIONS: &[Column] =
    &[text("location"), real("latitude"), real("longitude"), text("station_id")];

const POWER_LINES: &[Column] = &[
    text("start_location"),
    real("start_latitude"),
    real("start_longitude"),
    text("end_location"),
    real("end_latitude"),
    real("end_longitude"),
    text("line_id"),
];

const CONTACT_CENTER: &[Column] = &[
    text("customer_name"),
    text("customer_contact"),
    text("message"),
    opt_text("response"),
];

const OUTAGES: &[Column] = &[
    text("location"),
    real("latitude"),
    real("longitude"),
    text("status"),
    opt_text("resolution_time"),
];

/// The fixed set of tables in the store. SQL is only ever built from these
/// variants, never from caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Table {
    Customers,
    Meters,
    Poles,
    PowerLines,
    Transformers,
    PowerStations,
    ContactCenter,
    #[cfg_attr(feature = "serde", serde(rename = "kplc_outages"))]
    Outages,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Customers,
        Table::Meters,
        Table::Poles,
        Table::PowerLines,
        Table::Transformers,
        Table::PowerStations,
        Table::ContactCenter,
        Table::Outages,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Meters => "meters",
            Self::Poles => "poles",
            Self::PowerLines => "power_lines",
            Self::Transformers => "transformers",
            Self::PowerStations => "power_stations",
            Self::ContactCenter => "contact_center",
            Self::Outages => "kplc_outages",
        }
    }

    /// Catalogue columns in storage order, excluding `id`.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Customers => CUSTOMERS,
            Self::Meters => METERS,
            Self::Poles => POLES,
            Self::PowerLines => POWER_LINES,
            Self::Transformers => TRANSFORMERS,
            Self::PowerStations => POWER_STATIONS,
            Self::ContactCenter => CONTACT_CENTER,
            Self::Outages => OUTAGES,
        }
    }

    pub fn column(self, name: &str) -> Result<&'static Column, GridError> {
        self.columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| GridError::InvalidColumn { table: self, column: name.to_string() })
    }

    /// `id` followed by every catalogue column; the shape of exports and
    /// table views.
    pub fn header(self) -> Vec<&'static str> {
        std::iter::once("id")
            .chain(self.columns().iter().map(|c| c.name))
            .collect()
    }

    pub fn create_sql(self) -> String {
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT",
            self.name()
        );
        for col in self.columns() {
            sql.push_str(", ");
            sql.push_str(col.name);
            sql.push(' ');
            sql.push_str(col.kind.sql_type());
        }
        sql.push(')');
        sql
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| GridError::InvalidTable(s.to_string()))
    }
}
