pub mod asset_queries;
pub mod store;

pub use store::Store;
