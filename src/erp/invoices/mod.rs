pub mod aggregate;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod sanitize;

pub use error::{EtlError, Result};
