//! Extraction failure taxonomy.

use thiserror::Error;

/// Classified failures from the odds extraction pipeline.
///
/// Everything except `Engine` is a domain error: returned as a value,
/// mapped to a 400 response, never retried. `Engine` covers the browser
/// itself failing and maps to a 500.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL host must be {expected}")]
    WrongSite { expected: &'static str },

    #[error("timed out waiting for runner odds; the event may be in the past or not offering live odds yet")]
    EventNotAvailable,

    #[error("runner row {row} is missing {field}")]
    MalformedRow { row: usize, field: &'static str },

    #[error("browser engine failure: {0}")]
    Engine(anyhow::Error),
}
