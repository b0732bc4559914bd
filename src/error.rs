use thiserror::Error;

use crate::state::{Market, Outcome};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Rejections raised by the prediction, selection and booking operations.
///
/// Every variant is recoverable: the operation that produced it leaves the
/// container exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("form/h2h weights must sum to 100, got {form} + {h2h}")]
    InvalidWeights { form: u8, h2h: u8 },

    #[error("no selections to book")]
    EmptySelection,

    #[error("bookmaker name is empty")]
    EmptyBookmaker,

    #[error("booking code {0} is still active; clear it or regenerate explicitly")]
    BookingCodeActive(String),

    #[error("odds must be a finite decimal >= 1.0, got {0}")]
    InvalidOdds(f64),

    #[error("outcome {outcome:?} is not priced in market {market:?}")]
    OutcomeMarketMismatch { market: Market, outcome: Outcome },

    #[error("selection for fixture {id} carries fixture {fixture}")]
    FixtureMismatch { id: String, fixture: String },

    #[error("invalid form for {team}: {reason}")]
    InvalidForm { team: String, reason: String },

    #[error("invalid head-to-head record: {reason}")]
    InvalidHeadToHead { reason: String },
}
