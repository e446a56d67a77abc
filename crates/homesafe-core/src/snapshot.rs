// ── Fleet snapshots ──
//
// One poll cycle's worth of devices, captured atomically. Snapshots are
// never mutated: the coordinator swaps in a new one wholesale, so every
// field a reader sees comes from the same vendor response.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::{Device, RawDeviceRecord, VendorId};

const KEY_ID: &str = "id";

/// Raw device records keyed by device id, in vendor order.
pub type RawFleet = IndexMap<VendorId, RawDeviceRecord>;

/// Key a flat list of raw device objects by their `id` field.
///
/// Records without a usable id are dropped. A repeated id keeps the
/// later record.
pub fn raw_fleet_from_devices(devices: Vec<Map<String, Value>>) -> RawFleet {
    let mut fleet = RawFleet::with_capacity(devices.len());

    for fields in devices {
        let Some(id) = fields.get(KEY_ID).and_then(VendorId::from_json) else {
            let label = fields.get("label").and_then(Value::as_str).unwrap_or("<none>");
            warn!(label, "skipping device record without id");
            continue;
        };
        if fleet.insert(id.clone(), RawDeviceRecord::new(fields)).is_some() {
            warn!(%id, "duplicate device id in fleet response");
        }
    }

    fleet
}

/// Immutable set of devices fetched in one poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    generation: u64,
    fetched_at: DateTime<Utc>,
    devices: IndexMap<VendorId, Device>,
}

impl FleetSnapshot {
    /// Build a snapshot from a raw fleet. Pure; performs no I/O.
    pub fn build(raw_fleet: RawFleet) -> Self {
        Self::with_generation(raw_fleet, 0, Utc::now())
    }

    pub(crate) fn with_generation(
        raw_fleet: RawFleet,
        generation: u64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let devices = raw_fleet
            .into_iter()
            .map(|(id, record)| (id.clone(), Device::new(id, record)))
            .collect();

        Self {
            generation,
            fetched_at,
            devices,
        }
    }

    /// All devices in vendor order.
    pub fn devices(&self) -> &IndexMap<VendorId, Device> {
        &self.devices
    }

    pub fn device(&self, id: &VendorId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Resolve a user-supplied identifier: exact id first, then label
    /// (case-insensitive).
    pub fn find(&self, query: &str) -> Option<&Device> {
        self.devices.get(&VendorId::from(query)).or_else(|| {
            self.devices
                .values()
                .find(|d| d.label().eq_ignore_ascii_case(query))
        })
    }

    /// Poll cycle counter; strictly increasing across replacements.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
