//! Queries against the US Forest Service EDW feature services
//!
//! Thin convenience wrappers over the generic query builder for the two
//! layers the crate was written around. Every function takes the layer
//! endpoint explicitly so the same code runs against the live services or
//! a test double.

use geojson::FeatureCollection;

use crate::bbox::BoundingBox;
use crate::client::Client;
use crate::error::Result;
use crate::query::Query;

/// Administrative Forest Boundaries layer (one polygon per national forest,
/// `FORESTNAME` attribute).
pub const FOREST_BOUNDARIES_URL: &str =
    "https://apps.fs.usda.gov/arcx/rest/services/EDW/EDW_ForestSystemBoundaries_01/MapServer/0";

/// Invasive plant occurrence layer.
pub const INVASIVE_PLANTS_URL: &str =
    "https://apps.fs.usda.gov/arcx/rest/services/EDW/EDW_InvasiveSpecies_01/MapServer/0";

/// Quote a string literal for a WHERE clause. The services take single
/// quotes only; embedded quotes are doubled, SQL style.
fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Fetch the boundary of a single forest by exact `FORESTNAME` match.
pub async fn find_forest(
    client: &Client,
    endpoint: &str,
    name: &str,
) -> Result<FeatureCollection> {
    let clause = format!("FORESTNAME = {}", sql_quote(name));
    let query = Query::new(endpoint)
        .where_clause(&clause)
        .out_fields("*")
        .geojson();
    client.fetch_features(&query).await
}

/// Fetch every forest whose `FORESTNAME` contains the given substring.
pub async fn forests_matching(
    client: &Client,
    endpoint: &str,
    pattern: &str,
) -> Result<FeatureCollection> {
    let clause = format!("FORESTNAME LIKE {}", sql_quote(&format!("%{pattern}%")));
    let query = Query::new(endpoint)
        .where_clause(&clause)
        .out_fields("*")
        .geojson();
    client.fetch_features(&query).await
}

/// Envelope query for invasive plant occurrences. The result can contain
/// bbox-only false positives; run it through [`crate::spatial::refine`]
/// against the exact boundary to discard them.
pub async fn invasive_plants_within(
    client: &Client,
    endpoint: &str,
    bbox: &BoundingBox,
) -> Result<FeatureCollection> {
    let query = Query::new(endpoint)
        .geometry_envelope(bbox)
        .out_fields("*")
        .geojson();
    client.fetch_features(&query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_quoting_doubles_embedded_quotes() {
        assert_eq!(sql_quote("Angeles National Forest"), "'Angeles National Forest'");
        assert_eq!(sql_quote("O'Neill Forest"), "'O''Neill Forest'");
    }
}
