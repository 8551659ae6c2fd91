use super::{CalculatorError, GatewayError};

/// Why a calculate/command sequence did not apply.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("brightness calculation failed: {0}")]
    Calculator(#[from] CalculatorError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{failed} of {total} lights rejected the command")]
    Rejected { failed: usize, total: usize },
}
