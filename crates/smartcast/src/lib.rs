//! Client library for the local control API spoken by Vizio SmartCast
//! televisions and speakers.
//!
//! The API is HTTPS with a self-signed certificate on port 7345. Requests
//! carry an `AUTH` header obtained out-of-band by pairing with the device;
//! pairing itself is not implemented here. All responses share a common
//! envelope with a `STATUS` block and a list of `ITEMS`.
//!
//! [`Device`] is a blocking client holding the one logical connection
//! identity to a device. [`DeviceHandle`] wraps it for use from async code
//! by running each round-trip on the tokio blocking worker pool.

pub mod device;
pub mod error;
pub mod handle;
pub mod protocol;
pub mod types;

pub use device::Device;
pub use error::Error;
pub use error::Result;
pub use handle::DeviceHandle;
pub use types::DeviceClass;
pub use types::DeviceIdentity;
pub use types::PowerState;
pub use types::RemoteKey;
