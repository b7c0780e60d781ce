//! Exact spatial refinement
//!
//! Envelope filters are an overestimate: the server only tests candidate
//! features against the axis-aligned box, so anything inside the box but
//! outside the real shape comes back too. The refine pass replays the test
//! client-side against the exact reference geometries and drops the false
//! positives.

use geo::Intersects;
use geo_types::Geometry;
use geojson::FeatureCollection;

use crate::error::Result;

/// Convert every feature geometry in the collection into a geo-types
/// geometry. Features without a geometry (GeoJSON allows `null`) are
/// skipped; malformed coordinate arrays are an error.
pub fn feature_geometries(collection: &FeatureCollection) -> Result<Vec<Geometry<f64>>> {
    let mut geometries = Vec::with_capacity(collection.features.len());
    for feature in &collection.features {
        if let Some(geometry) = &feature.geometry {
            geometries.push(Geometry::<f64>::try_from(geometry).map_err(Box::new)?);
        }
    }
    Ok(geometries)
}

/// Keep only the candidates that truly intersect at least one reference
/// geometry. The output is always a subset of the input by feature
/// identity; features are moved, not cloned.
pub fn refine(
    candidates: FeatureCollection,
    reference: &FeatureCollection,
) -> Result<FeatureCollection> {
    let reference_shapes = feature_geometries(reference)?;

    let mut kept = Vec::new();
    let total = candidates.features.len();
    for feature in candidates.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let shape = Geometry::<f64>::try_from(geometry).map_err(Box::new)?;
        if reference_shapes.iter().any(|r| r.intersects(&shape)) {
            kept.push(feature);
        }
    }
    tracing::debug!(kept = kept.len(), total, "refined envelope query result");

    Ok(FeatureCollection {
        bbox: None,
        features: kept,
        foreign_members: None,
    })
}
