// homesafe-api: Async Rust client for the HomeSafe detector cloud.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::HomesafeClient;
pub use error::Error;
pub use models::{Dataset, DeviceCommand, Location};
pub use transport::TransportConfig;
