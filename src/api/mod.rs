//! eCFR REST API access.

pub mod client;
pub mod types;

pub use client::{ClientConfig, EcfrClient, FetchError};
