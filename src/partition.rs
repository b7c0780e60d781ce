//! Tiled fetching
//!
//! A single envelope query can only return as many features as the server's
//! page cap allows. The way past the cap is to split the envelope into
//! tiles and query each one. Tile edges are shared between neighbours, so
//! a feature straddling an edge comes back from more than one tile; tiled
//! results are deduplicated by feature identity before they are merged.

use std::collections::HashSet;

use geojson::{Feature, FeatureCollection, feature::Id};

use crate::bbox::BoundingBox;
use crate::client::Client;
use crate::error::Result;
use crate::query::Query;

/// Run `base` once per tile of an `nx` x `ny` split of `bbox`, merging the
/// results. Tiles are fetched sequentially, each awaited before the next.
///
/// The per-tile query inherits everything set on `base` (WHERE clause,
/// outFields, format, ...); the envelope parameters are overwritten per
/// tile. A transfer-limit error on any tile propagates; the caller wants
/// a finer grid, not a silently incomplete merge.
pub async fn fetch_tiled(
    client: &Client,
    base: &Query,
    bbox: &BoundingBox,
    nx: usize,
    ny: usize,
) -> Result<FeatureCollection> {
    let tiles = bbox.split(nx, ny);
    let mut seen = HashSet::new();
    let mut features = Vec::new();

    for (index, tile) in tiles.iter().enumerate() {
        let query = base.clone().geometry_envelope(tile);
        let collection = client.fetch_features(&query).await?;
        tracing::debug!(
            tile = index,
            of = tiles.len(),
            fetched = collection.features.len(),
            "fetched tile"
        );
        for feature in collection.features {
            if seen.insert(feature_key(&feature)) {
                features.push(feature);
            }
        }
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Stable identity for deduplication: the GeoJSON feature id when the
/// server assigns one, else the OBJECTID attribute every Esri layer
/// carries, else the serialized geometry as a last resort.
fn feature_key(feature: &Feature) -> String {
    if let Some(id) = &feature.id {
        return match id {
            Id::String(s) => format!("id:{s}"),
            Id::Number(n) => format!("id:{n}"),
        };
    }
    if let Some(objectid) = feature.property("OBJECTID") {
        return format!("oid:{objectid}");
    }
    feature
        .geometry
        .as_ref()
        .map(|g| g.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Option<geojson::Geometry> {
        Some(geojson::Geometry::new(geojson::Value::Point(vec![x, y])))
    }

    fn feature(id: Option<Id>, objectid: Option<i64>, x: f64) -> Feature {
        let properties = objectid.map(|oid| {
            let mut map = geojson::JsonObject::new();
            map.insert("OBJECTID".to_string(), serde_json::json!(oid));
            map
        });
        Feature {
            bbox: None,
            geometry: point(x, 0.0),
            id,
            properties,
            foreign_members: None,
        }
    }

    #[test]
    fn explicit_id_wins_over_objectid() {
        let f = feature(Some(Id::Number(7.into())), Some(99), 0.0);
        assert_eq!(feature_key(&f), "id:7");
    }

    #[test]
    fn objectid_wins_over_geometry() {
        let f = feature(None, Some(99), 0.0);
        assert_eq!(feature_key(&f), "oid:99");
    }

    #[test]
    fn geometry_is_the_fallback_identity() {
        let a = feature(None, None, 1.0);
        let b = feature(None, None, 1.0);
        let c = feature(None, None, 2.0);
        assert_eq!(feature_key(&a), feature_key(&b));
        assert_ne!(feature_key(&a), feature_key(&c));
    }

    #[test]
    fn same_objectid_from_two_tiles_counts_once() {
        let mut seen = HashSet::new();
        let first = feature(None, Some(42), 0.0);
        let duplicate = feature(None, Some(42), 0.0);
        assert!(seen.insert(feature_key(&first)));
        assert!(!seen.insert(feature_key(&duplicate)));
    }
}
