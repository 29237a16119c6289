//! Inspector configuration

/// Maximum stringified length (exclusive) of a tag shown in the raw view
pub const DEFAULT_RAW_VALUE_LIMIT: usize = 500;

/// Zoom level the map view opens at
pub const DEFAULT_MAP_ZOOM: u8 = 15;

/// External map service; the coordinate pair is appended as `<lat>,<lon>`
pub const DEFAULT_MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

#[derive(Debug, Clone)]
pub struct InspectorConfig {
    pub raw_value_limit: usize,
    pub map_zoom: u8,
    pub maps_search_url: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            raw_value_limit: DEFAULT_RAW_VALUE_LIMIT,
            map_zoom: DEFAULT_MAP_ZOOM,
            maps_search_url: DEFAULT_MAPS_SEARCH_URL.to_string(),
        }
    }
}
