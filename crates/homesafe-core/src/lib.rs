//! Polling coordinator and device-data normalization for HomeSafe
//! smoke, CO, and water-leak detectors.
//!
//! The [`Coordinator`] fetches the fleet through a [`FleetTransport`],
//! builds an immutable [`FleetSnapshot`], and serves the last good one to
//! readers. Devices expose their fields through the [`catalog`], read with
//! total decoders that never fail on vendor inconsistencies.

pub mod catalog;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod transport;
pub mod units;

pub use catalog::{FieldSpec, ObservableKind, Reading, ReadingValue};
pub use command::{CommandDispatcher, CommandKind};
pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorState};
pub use decode::{DecodedField, DecoderKind, Measurement, ScalarValue};
pub use error::{CoreError, FailureKind, RefreshError};
pub use model::{Device, DeviceIdentity, ModelClass, ModelClassDescription, RawDeviceRecord, VendorId};
pub use snapshot::{FleetSnapshot, RawFleet};
pub use transport::FleetTransport;
pub use units::{CanonicalUnit, normalize_unit};

pub use homesafe_api::{HomesafeClient, TransportConfig};
