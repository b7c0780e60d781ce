//! Interactive map output
//!
//! A write-only sink: feature collections go in, one self-contained HTML
//! page with a Leaflet slippy map comes out. The page inlines the GeoJSON
//! and pulls Leaflet itself from its CDN, so the file works opened straight
//! from disk.

use std::fs;
use std::path::Path;

use geojson::FeatureCollection;

use crate::error::Result;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Clone)]
pub struct LayerStyle {
    pub color: String,
    pub weight: u32,
    pub fill_opacity: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            weight: 2,
            fill_opacity: 0.2,
        }
    }
}

struct Overlay {
    name: String,
    geojson: String,
    style: LayerStyle,
}

pub struct MapPage {
    title: String,
    overlays: Vec<Overlay>,
}

impl MapPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            overlays: Vec::new(),
        }
    }

    pub fn add_layer(&mut self, name: impl Into<String>, collection: &FeatureCollection, style: LayerStyle) {
        self.overlays.push(Overlay {
            name: name.into(),
            geojson: collection.to_string(),
            style,
        });
    }

    pub fn render(&self) -> String {
        let mut layers_js = String::new();
        for (index, overlay) in self.overlays.iter().enumerate() {
            // "</" inside inline JSON would terminate the script element.
            let data = overlay.geojson.replace("</", "<\\/");
            let name = overlay.name.replace('"', "\\\"");
            layers_js.push_str(&format!(
                r#"var layer{index} = L.geoJSON({data}, {{
  style: {{ color: "{color}", weight: {weight}, fillOpacity: {fill_opacity} }},
  pointToLayer: function (feature, latlng) {{
    return L.circleMarker(latlng, {{ radius: 5, color: "{color}", fillOpacity: {fill_opacity} }});
  }}
}}).addTo(map);
overlays["{name}"] = layer{index};
"#,
                index = index,
                data = data,
                name = name,
                color = overlay.style.color,
                weight = overlay.style.weight,
                fill_opacity = overlay.style.fill_opacity,
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{leaflet_css}">
<script src="{leaflet_js}"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map");
L.tileLayer("{tiles}", {{ attribution: "{attribution}" }}).addTo(map);
var overlays = {{}};
{layers_js}
L.control.layers(null, overlays).addTo(map);
var group = L.featureGroup(Object.values(overlays));
if (group.getLayers().length > 0) {{
  map.fitBounds(group.getBounds());
}} else {{
  map.setView([0, 0], 2);
}}
</script>
</body>
</html>
"#,
            title = self.title,
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            tiles = OSM_TILES,
            attribution = OSM_ATTRIBUTION,
            layers_js = layers_js,
        )
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())?;
        tracing::info!(path = %path.display(), layers = self.overlays.len(), "wrote map page");
        Ok(())
    }
}
