pub mod api;
pub mod config;
pub mod export;
pub mod importer;
pub mod map;
pub mod metrics_server;
pub mod notify;
pub mod observability;
pub mod registry;
pub mod validation;

pub use registry::AssetRegistry;
