//! Access to the imaging server: instance lists, previews and measurements.

mod client;
mod error;
mod http;
mod worker;

pub use client::{MeasurementClient, SeriesSource};
pub use error::ApiError;
pub use http::HttpBackend;
pub use worker::{RequestThread, execute};
