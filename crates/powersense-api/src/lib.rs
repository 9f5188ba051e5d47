// powersense-api: Async Rust client for the PowerSense telemetry service

pub mod client;
pub mod error;
pub mod models;
mod power;
mod sensor;
pub mod transport;

pub use client::TelemetryClient;
pub use error::Error;
pub use models::{AvgPowerResponse, SensorDataResponse, WireHistoryPoint, WireNumber};
pub use transport::TransportConfig;
