use std::path::PathBuf;
use thiserror::Error;

/// Error type used by operations in this crate.
#[derive(Debug, Error)]
pub enum KMeansError {
    /// The input file is missing or unreadable.
    #[error("failed to open input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A record of the input file could not be parsed as `x,y`.
    #[error("malformed record at line {line}: {reason}")]
    Parse { line: u64, reason: String },
    /// There are no points to cluster.
    #[error("no points to cluster")]
    DegenerateInput,
    /// A point has a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
    #[error("cluster count {k} is out of range for {points} points")]
    InvalidClusterCount { k: usize, points: usize },
    /// The result file could not be written.
    #[error("failed to write results to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;
