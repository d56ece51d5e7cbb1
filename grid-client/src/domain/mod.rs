pub mod contact_message;
pub mod coordinate;
pub mod customer;
pub mod outage;
pub mod point_asset;
pub mod power_line;
pub mod record;
pub mod table;

pub use contact_message::{ContactMessage, NewContactMessage};
pub use coordinate::{check_latitude, check_longitude, LatLon};
pub use customer::{Customer, NewCustomer};
pub use outage::{NewOutage, OutageRecord, OutageStatus};
pub use point_asset::{AssetKind, NewPointAsset, PointAsset};
pub use power_line::{NewPowerLine, PowerLine};
pub use record::{Record, Value};
pub use table::{Column, ColumnKind, Table};
