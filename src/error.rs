//! Error taxonomy for the ingestion and load pipeline.
//!
//! Row- and sample-level problems are recovered by the caller (skipped and
//! counted). Only [`LoadError`] aborts a load.

use thiserror::Error;

/// A raw row that does not line up with its source's shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("row at line {line} has {found} fields, header has {expected}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("element {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// The input as a whole could not be read.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("delimited text could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON could not be read: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array or an object with a `data` array, found {0}")]
    UnexpectedShape(&'static str),
}

/// A row that cannot become a [`crate::sample::Sample`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedSample {
    #[error("timestamp field `{key}` is missing")]
    MissingTimestamp { key: String },
    #[error("timestamp `{value}` could not be parsed")]
    UnparsableTimestamp { value: String },
}

/// A location load that produced nothing usable.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("historical data fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(
        "no valid samples for {location} ({malformed_rows} malformed rows, {malformed_samples} malformed samples)"
    )]
    NoValidSamples {
        location: String,
        malformed_rows: usize,
        malformed_samples: usize,
    },
}
