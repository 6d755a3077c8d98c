use thiserror::Error;

/// Recoverable failure conditions reported by the greenwave core.
///
/// Every variant corresponds to a "no result" outcome: the inputs were not
/// sufficient to produce a meaningful fit or comparison. None of these are
/// fatal, callers are expected to surface them as user-facing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GreenwaveError {
    #[error("empty observation series")]
    EmptySeries,

    #[error("insufficient observations for phenology fitting: got {actual}, need at least {required}")]
    InsufficientObservations { required: usize, actual: usize },

    #[error("insufficient date overlap between series: got {actual} paired samples, need at least {required}")]
    InsufficientOverlap { required: usize, actual: usize },

    #[error("Invalid fit parameter: {0}")]
    InvalidFitParameter(String),
}
