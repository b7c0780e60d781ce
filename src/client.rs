//! HTTP fetch and response parsing
//!
//! One blocking-style await per request, no fan-out, no retries: every
//! failure propagates to the caller. The one thing the client refuses to
//! pass through quietly is a truncated result: a payload flagged with
//! `exceededTransferLimit` comes back as an error, never as a complete
//! collection.

use std::time::Duration;

use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::Query;

pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::from_env())
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http })
    }

    /// Execute the query and parse the body as a GeoJSON FeatureCollection.
    /// The query should request `f=geojson`; the esri-json `f=json` layout
    /// does not parse as GeoJSON.
    pub async fn fetch_features(&self, query: &Query) -> Result<FeatureCollection> {
        let body = self.fetch_body(query).await?;
        parse_feature_body(&body)
    }

    /// Execute the query and hand back the raw JSON value, untyped. Useful
    /// for poking at a service response before deciding how to consume it.
    pub async fn fetch_json(&self, query: &Query) -> Result<Value> {
        let body = self.fetch_body(query).await?;
        let value: Value = serde_json::from_str(body.trim_end())?;
        if let Some(error) = value.get("error") {
            return Err(service_error(error));
        }
        Ok(value)
    }

    async fn fetch_body(&self, query: &Query) -> Result<String> {
        let url = Url::parse(&query.url())?;
        tracing::debug!(%url, "querying feature service");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Parse a response body into a FeatureCollection.
///
/// Trailing whitespace (or a missing trailing newline) is not an error;
/// the body is trimmed before parsing. An Esri error envelope and the
/// transfer-limit flag are both checked before the collection is accepted.
pub fn parse_feature_body(body: &str) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_str(body.trim_end())?;

    if let Some(error) = value.get("error") {
        return Err(service_error(error));
    }

    // With f=geojson the flag rides along as a foreign member at the top
    // level; some servers nest it under "properties" instead.
    let truncated = value
        .get("exceededTransferLimit")
        .or_else(|| {
            value
                .get("properties")
                .and_then(|p| p.get("exceededTransferLimit"))
        })
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let collection = match GeoJson::try_from(value)? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(_) => return Err(Error::UnexpectedBody("a single feature")),
        GeoJson::Geometry(_) => return Err(Error::UnexpectedBody("a bare geometry")),
    };

    if truncated {
        return Err(Error::TransferLimitExceeded {
            received: collection.features.len(),
        });
    }

    Ok(collection)
}

fn service_error(error: &Value) -> Error {
    Error::Service {
        code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
        message: error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown service error")
            .to_string(),
    }
}
