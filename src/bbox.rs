//! Bounding box derivation
//!
//! The minimal axis-aligned extent of a feature collection, tagged with the
//! spatial reference (well-known id) its coordinates are expressed in. The
//! wkid travels with the box so a query built from it always gets a matching
//! `inSR`; a box and its CRS are never separated.

use geo::BoundingRect;
use geo_types::{Polygon, Rect, coord};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spatial::feature_geometries;

/// EPSG:4326, the wkid GeoJSON coordinates are in unless stated otherwise.
pub const WGS84: u32 = 4326;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub wkid: u32,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, wkid: u32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            wkid,
        }
    }

    /// Coordinate-wise min/max across every geometry in the collection.
    /// Features without a geometry are skipped; a collection with no
    /// coordinates at all has no extent and errors.
    pub fn from_features(collection: &FeatureCollection, wkid: u32) -> Result<Self> {
        let mut extent: Option<Rect<f64>> = None;
        for geometry in feature_geometries(collection)? {
            if let Some(rect) = geometry.bounding_rect() {
                extent = Some(match extent {
                    Some(acc) => merge(acc, rect),
                    None => rect,
                });
            }
        }
        let rect = extent.ok_or(Error::EmptyExtent)?;
        Ok(Self::new(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
            wkid,
        ))
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.xmin, y: self.ymin },
            coord! { x: self.xmax, y: self.ymax },
        )
    }

    /// The box as an exact five-point ring. Deriving a box from this polygon
    /// gives back the original box.
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }

    /// The `geometry` parameter encoding for `geometryType=esriGeometryEnvelope`:
    /// four comma-joined scalars, xmin,ymin,xmax,ymax.
    pub fn envelope_param(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }

    /// Split into an `nx` x `ny` grid of equally sized tiles in the same
    /// spatial reference. Neighbouring tiles share edges, so features lying
    /// on a shared edge can come back from more than one tile query; the
    /// tiled fetch in `partition` dedupes for exactly that reason.
    pub fn split(&self, nx: usize, ny: usize) -> Vec<BoundingBox> {
        let nx = nx.max(1);
        let ny = ny.max(1);
        let width = (self.xmax - self.xmin) / nx as f64;
        let height = (self.ymax - self.ymin) / ny as f64;

        let mut tiles = Vec::with_capacity(nx * ny);
        for row in 0..ny {
            for col in 0..nx {
                let xmin = self.xmin + col as f64 * width;
                let ymin = self.ymin + row as f64 * height;
                tiles.push(BoundingBox::new(
                    xmin,
                    ymin,
                    xmin + width,
                    ymin + height,
                    self.wkid,
                ));
            }
        }
        tiles
    }
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Feature, Geometry};

    fn polygon_feature(ring: Vec<Vec<f64>>) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn encloses_every_vertex() {
        let fc = collection(vec![
            polygon_feature(vec![
                vec![-118.9, 34.1],
                vec![-118.0, 34.1],
                vec![-118.0, 34.8],
                vec![-118.9, 34.8],
                vec![-118.9, 34.1],
            ]),
            polygon_feature(vec![
                vec![-117.9, 34.3],
                vec![-117.5, 34.3],
                vec![-117.5, 34.9],
                vec![-117.9, 34.9],
                vec![-117.9, 34.3],
            ]),
        ]);

        let bbox = BoundingBox::from_features(&fc, WGS84).unwrap();
        assert!(bbox.xmin <= -118.9);
        assert!(bbox.ymin <= 34.1);
        assert!(bbox.xmax >= -117.5);
        assert!(bbox.ymax >= 34.9);
        assert_eq!(bbox.wkid, WGS84);
    }

    #[test]
    fn derivation_is_idempotent() {
        let bbox = BoundingBox::new(-120.5, 38.7, -119.8, 39.4, WGS84);

        let polygon = bbox.to_polygon();
        let fc = collection(vec![Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&polygon))),
            id: None,
            properties: None,
            foreign_members: None,
        }]);

        let rederived = BoundingBox::from_features(&fc, WGS84).unwrap();
        assert!((rederived.xmin - bbox.xmin).abs() < TOLERANCE);
        assert!((rederived.ymin - bbox.ymin).abs() < TOLERANCE);
        assert!((rederived.xmax - bbox.xmax).abs() < TOLERANCE);
        assert!((rederived.ymax - bbox.ymax).abs() < TOLERANCE);
    }

    #[test]
    fn empty_collection_has_no_extent() {
        let fc = collection(vec![]);
        assert!(matches!(
            BoundingBox::from_features(&fc, WGS84),
            Err(crate::Error::EmptyExtent)
        ));
    }

    #[test]
    fn split_tiles_cover_the_box() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 2.0, WGS84);
        let tiles = bbox.split(4, 2);
        assert_eq!(tiles.len(), 8);

        let xmin = tiles.iter().map(|t| t.xmin).fold(f64::INFINITY, f64::min);
        let ymax = tiles
            .iter()
            .map(|t| t.ymax)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!((xmin - 0.0).abs() < TOLERANCE);
        assert!((ymax - 2.0).abs() < TOLERANCE);
        for tile in &tiles {
            assert!((tile.xmax - tile.xmin - 1.0).abs() < TOLERANCE);
            assert!((tile.ymax - tile.ymin - 1.0).abs() < TOLERANCE);
            assert_eq!(tile.wkid, WGS84);
        }
    }
}
