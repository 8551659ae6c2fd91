pub mod curve;
pub mod request;

pub use curve::CompensationCurve;
pub use request::{calculate_from_json, CalculatorInput, InputError};
