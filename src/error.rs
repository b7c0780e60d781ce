//! Crate-level error type
//!
//! Everything a query can fail with is surfaced here; nothing is retried or
//! swallowed inside the library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Esri error envelope (`{"error": {"code": .., "message": ..}}`),
    /// returned with HTTP 200 for e.g. malformed WHERE clauses.
    #[error("service error {code}: {message}")]
    Service { code: i64, message: String },

    #[error("invalid JSON in response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The server hit its per-request record cap and truncated the result.
    /// Callers must re-partition the query, not use the partial set.
    #[error("result truncated at {received} features (exceededTransferLimit)")]
    TransferLimitExceeded { received: usize },

    #[error("expected a FeatureCollection response, got {0}")]
    UnexpectedBody(&'static str),

    #[error("invalid query URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("feature collection has no coordinates to derive an extent from")]
    EmptyExtent,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::GeoJson(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
