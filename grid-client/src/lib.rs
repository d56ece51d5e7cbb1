//! Record store and domain model for grid assets, customer reports and
//! contact-center messages.

pub mod db;
pub mod domain;
pub mod error;

pub use db::Store;
pub use error::{ErrorClass, GridError, Result};
