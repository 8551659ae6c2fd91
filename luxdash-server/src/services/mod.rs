mod calculator_service;
mod command_service;
mod control_loop;
mod presentation;
mod status_service;
mod vendor;

pub use calculator_service::*;
pub use command_service::*;
pub use control_loop::*;
pub use presentation::*;
pub use status_service::*;
pub use vendor::*;
