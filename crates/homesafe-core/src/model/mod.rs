// ── Domain model ──
//
// Typed views over the vendor's loosely-typed device records.

pub mod device;
pub mod record;
pub mod vendor_id;

pub use device::{Device, DeviceIdentity, ModelClass, ModelClassDescription};
pub use record::RawDeviceRecord;
pub use vendor_id::VendorId;
