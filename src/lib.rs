//! arcquery: a client for Esri REST Feature/Map Services.
//!
//! The workflow the crate is built around:
//! 1. build a typed query (`query`) and fetch it as GeoJSON (`client`);
//! 2. derive the bounding box of the result (`bbox`);
//! 3. reuse the box as an envelope filter on a second layer, then discard
//!    the bbox-only false positives with an exact spatial pass (`spatial`);
//! 4. go beyond the server's page cap with tiled queries (`partition`);
//! 5. look at everything on a slippy map (`map`).

pub mod bbox;
pub mod client;
pub mod config;
pub mod error;
pub mod map;
pub mod partition;
pub mod query;
pub mod services;
pub mod spatial;

pub use bbox::{BoundingBox, WGS84};
pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use query::{Query, ResponseFormat, SpatialRel};
