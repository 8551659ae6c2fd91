mod control;
mod group;
mod notification;
mod number;
mod setpoint;
mod status;

pub use control::*;
pub use group::*;
pub use notification::*;
pub use number::*;
pub use setpoint::*;
pub use status::*;

/// Vendor-assigned device identifier.
pub type DeviceId = String;

/// Upper bound of the illuminance setpoint in lux.
pub const MAX_TARGET_ILLUMINANCE: f64 = 1500.0;

/// Upper bound of a lamp brightness level in percent.
pub const MAX_BRIGHTNESS: u8 = 100;
