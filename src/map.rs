//! Map view for a located photo
//!
//! Tiles and marker rendering are left to Leaflet; this module only decides
//! where the map opens and what the marker says, and builds the external
//! map-service link.

use serde::{Deserialize, Serialize};

use crate::gps::Coordinate;

pub const MARKER_POPUP: &str = "Photo location";
pub const MARKER_TOOLTIP: &str = "Click here";

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Coordinate,
    pub popup: String,
    pub tooltip: String,
}

/// One-marker map centred on the photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: Marker,
}

impl MapView {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            marker: Marker {
                position: center,
                popup: MARKER_POPUP.to_string(),
                tooltip: MARKER_TOOLTIP.to_string(),
            },
        }
    }

    /// `<link>`/`<script>` tags Leaflet needs in the page head
    pub fn head_html() -> String {
        format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n<script src=\"{}\"></script>\n",
            LEAFLET_CSS, LEAFLET_JS
        )
    }

    /// Map container and the script that populates it
    pub fn body_html(&self) -> String {
        let lat = self.center.latitude;
        let lon = self.center.longitude;
        format!(
            r#"<div id="map" style="width: 800px; height: 500px;"></div>
<script>
  var map = L.map('map').setView([{lat}, {lon}], {zoom});
  L.tileLayer('{tiles}', {{ attribution: '&copy; OpenStreetMap contributors' }}).addTo(map);
  L.marker([{mlat}, {mlon}]).addTo(map)
    .bindPopup({popup})
    .bindTooltip({tooltip});
</script>
"#,
            lat = lat,
            lon = lon,
            zoom = self.zoom,
            tiles = TILE_URL,
            mlat = self.marker.position.latitude,
            mlon = self.marker.position.longitude,
            popup = js_string(&self.marker.popup),
            tooltip = js_string(&self.marker.tooltip),
        )
    }
}

/// External map link with the literal decimal values appended
pub fn maps_search_url(base: &str, coordinate: Coordinate) -> String {
    format!("{}{},{}", base, coordinate.latitude, coordinate.longitude)
}

/// JSON string literal, which is also a valid JS literal; `<` is escaped so
/// it cannot close the script element
fn js_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAPS_SEARCH_URL;

    fn coord() -> Coordinate {
        Coordinate { latitude: 40.5, longitude: -79.25 }
    }

    #[test]
    fn test_maps_url() {
        assert_eq!(
            maps_search_url(DEFAULT_MAPS_SEARCH_URL, coord()),
            "https://www.google.com/maps/search/?api=1&query=40.5,-79.25"
        );
    }

    #[test]
    fn test_map_view_marker() {
        let view = MapView::new(coord(), 15);
        assert_eq!(view.zoom, 15);
        assert_eq!(view.marker.position, coord());
        assert_eq!(view.marker.popup, MARKER_POPUP);
    }

    #[test]
    fn test_body_html() {
        let html = MapView::new(coord(), 15).body_html();
        assert!(html.contains("setView([40.5, -79.25], 15)"));
        assert!(html.contains("L.marker([40.5, -79.25])"));
        assert!(html.contains("bindPopup(\"Photo location\")"));
        assert!(html.contains("{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"));
    }

    #[test]
    fn test_js_string_escapes_script_close() {
        assert_eq!(js_string("</script>"), "\"\\u003c/script>\"");
    }
}
