mod calculate_handle;
mod control_handle;
mod dashboard_handle;
mod setpoint_handle;
mod sse_handle;
mod status_handle;

pub use calculate_handle::*;
pub use control_handle::*;
pub use dashboard_handle::*;
pub use setpoint_handle::*;
pub use sse_handle::*;
pub use status_handle::*;
