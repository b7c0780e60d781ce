//! Esri REST query construction
//!
//! A `Query` is a layer endpoint (`{host}/{service}/MapServer/{layerId}`)
//! plus a set of named parameters. Parameters that are never set are not
//! emitted at all, so the server applies its own defaults; an omitted key
//! is not the same thing as an empty value.

use std::collections::BTreeMap;

use crate::bbox::BoundingBox;

/// Spatial relationship between the filter geometry and candidate features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialRel {
    Intersects,
    Contains,
    Within,
    EnvelopeIntersects,
}

impl SpatialRel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialRel::Intersects => "esriSpatialRelIntersects",
            SpatialRel::Contains => "esriSpatialRelContains",
            SpatialRel::Within => "esriSpatialRelWithin",
            SpatialRel::EnvelopeIntersects => "esriSpatialRelEnvelopeIntersects",
        }
    }
}

/// Response format requested via the `f` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    GeoJson,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::GeoJson => "geojson",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    endpoint: String,
    // BTreeMap keeps emission order stable across runs.
    params: BTreeMap<String, String>,
}

impl Query {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    /// Set an arbitrary parameter. The typed setters below cover the keys
    /// the feature services recognize; this is the escape hatch for the rest.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// SQL-ish attribute filter, e.g. `FORESTNAME = 'Angeles National Forest'`.
    /// String literals use single quotes; the server rejects double quotes.
    pub fn where_clause(self, clause: &str) -> Self {
        self.param("where", clause)
    }

    /// Comma-separated attribute list, or `*` for all fields.
    pub fn out_fields(self, fields: &str) -> Self {
        self.param("outFields", fields)
    }

    /// Use a bounding box as the geometry filter. Sets `geometry`,
    /// `geometryType`, `spatialRel` and `inSR` together so the spatial
    /// reference can never drift from the coordinates it describes.
    pub fn geometry_envelope(self, bbox: &BoundingBox) -> Self {
        self.param("geometry", bbox.envelope_param())
            .param("geometryType", "esriGeometryEnvelope")
            .param("spatialRel", SpatialRel::Intersects.as_str())
            .param("inSR", bbox.wkid.to_string())
    }

    pub fn spatial_rel(self, rel: SpatialRel) -> Self {
        self.param("spatialRel", rel.as_str())
    }

    pub fn in_sr(self, wkid: u32) -> Self {
        self.param("inSR", wkid.to_string())
    }

    pub fn out_sr(self, wkid: u32) -> Self {
        self.param("outSR", wkid.to_string())
    }

    /// Page size cap. Left unset, the server applies its own maximum
    /// (historically 1000 for the EDW services); results larger than that
    /// need tiled queries, see the `partition` module.
    pub fn result_record_count(self, count: u32) -> Self {
        self.param("resultRecordCount", count.to_string())
    }

    pub fn return_geometry(self, yes: bool) -> Self {
        self.param("returnGeometry", if yes { "true" } else { "false" })
    }

    pub fn format(self, format: ResponseFormat) -> Self {
        self.param("f", format.as_str())
    }

    /// Shorthand for `format(ResponseFormat::GeoJson)`, the format the
    /// fetch path parses.
    pub fn geojson(self) -> Self {
        self.format(ResponseFormat::GeoJson)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Full percent-encoded query URL. Only values are encoded; the
    /// recognized keys are plain ASCII.
    pub fn url(&self) -> String {
        let query_string = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!(
            "{}/query?{}",
            self.endpoint.trim_end_matches('/'),
            query_string
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::{BoundingBox, WGS84};

    const ENDPOINT: &str = "https://example.com/arcgis/rest/services/EDW/MapServer/0";

    #[test]
    fn emits_only_set_keys() {
        let query = Query::new(ENDPOINT)
            .where_clause("FORESTNAME = 'Angeles National Forest'")
            .out_fields("*")
            .geojson();

        let url = query.url();
        assert!(url.contains("where="));
        assert!(url.contains("outFields="));
        assert!(url.contains("f=geojson"));
        // Unset keys must not appear, even as empty values.
        assert!(!url.contains("resultRecordCount"));
        assert!(!url.contains("geometry"));
        assert!(!url.contains("inSR"));
    }

    #[test]
    fn values_round_trip_through_encoding() {
        let clause = "FORESTNAME LIKE '%Tahoe National%'";
        let query = Query::new(ENDPOINT).where_clause(clause);

        let url = query.url();
        let encoded = url.split("where=").nth(1).unwrap();
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('\''));
        assert_eq!(urlencoding::decode(encoded).unwrap(), clause);
    }

    #[test]
    fn parameter_order_is_stable() {
        let a = Query::new(ENDPOINT)
            .out_fields("*")
            .where_clause("1=1")
            .geojson();
        let b = Query::new(ENDPOINT)
            .geojson()
            .where_clause("1=1")
            .out_fields("*");
        assert_eq!(a.url(), b.url());
    }

    #[test]
    fn envelope_carries_its_spatial_reference() {
        let bbox = BoundingBox::new(-118.9, 34.1, -117.5, 34.9, WGS84);
        let query = Query::new(ENDPOINT).geometry_envelope(&bbox);

        let params = query.params();
        assert_eq!(params.get("geometry").unwrap(), "-118.9,34.1,-117.5,34.9");
        assert_eq!(params.get("geometryType").unwrap(), "esriGeometryEnvelope");
        assert_eq!(params.get("spatialRel").unwrap(), "esriSpatialRelIntersects");
        assert_eq!(params.get("inSR").unwrap(), "4326");
    }

    #[test]
    fn later_set_overwrites_earlier() {
        let query = Query::new(ENDPOINT).out_fields("*").out_fields("FORESTNAME");
        assert_eq!(query.params().get("outFields").unwrap(), "FORESTNAME");
    }

    #[test]
    fn trailing_slash_on_endpoint_is_tolerated() {
        let query = Query::new(format!("{}/", ENDPOINT)).geojson();
        assert!(query.url().starts_with(&format!("{}/query?", ENDPOINT)));
    }
}
