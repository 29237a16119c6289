//! Inspection report
//!
//! Shapes extracted metadata for display: a five-row summary, a filtered raw
//! view, and the GPS section's display state. Renders as plain text, JSON,
//! or a standalone HTML page with a Leaflet map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::config::InspectorConfig;
use crate::gps::{extract_coordinate, Coordinate};
use crate::map::{maps_search_url, MapView};
use crate::metadata::{ExifTables, GpsMetadata, RawMetadata};
use crate::upload::Dimensions;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_DIMENSION: &str = "?";

pub const MSG_NO_EXIF: &str =
    "This image has no EXIF metadata. It may have been edited or downloaded from a social network.";
pub const MSG_NO_GPS: &str = "Clean trail: no GPS information found in this image.";
pub const MSG_GPS_NOT_INSPECTED: &str = "Location not checked: the EXIF block could not be read.";
pub const MSG_GPS_INCOMPLETE: &str = "The image has GPS data, but it is corrupt or incomplete.";
pub const MSG_SHUTTER: &str = "Exact spot where the camera shutter fired.";
pub const MSG_TIP: &str =
    "Tip: messaging apps strip metadata on upload. Use original camera files or files sent as documents.";

/// One `Property | Value` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub property: String,
    pub value: String,
}

impl SummaryRow {
    fn new(property: &str, value: String) -> Self {
        Self { property: property.to_string(), value }
    }
}

/// Outcome of reading the EXIF block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExifSection {
    Present {
        summary: Vec<SummaryRow>,
        raw: BTreeMap<String, String>,
    },
    /// Block present but holds no general tags
    Empty,
    /// No EXIF block at all
    Missing,
    Error { message: String },
}

/// GPS display state; terminal for a given report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GpsSection {
    /// EXIF could not be read, so the GPS block was never examined
    NotInspected,
    NoGpsBlock,
    GpsBlockIncomplete {
        reason: String,
    },
    CoordinatesFound {
        coordinate: Coordinate,
        maps_url: String,
        map: MapView,
    },
}

impl GpsSection {
    pub fn state_name(&self) -> &'static str {
        match self {
            GpsSection::NotInspected => "NOT_INSPECTED",
            GpsSection::NoGpsBlock => "NO_GPS_BLOCK",
            GpsSection::GpsBlockIncomplete { .. } => "GPS_BLOCK_INCOMPLETE",
            GpsSection::CoordinatesFound { .. } => "COORDINATES_FOUND",
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            GpsSection::CoordinatesFound { coordinate, .. } => Some(*coordinate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub file_name: String,
    pub content_type: Option<String>,
    pub pixel_dimensions: Option<Dimensions>,
    pub exif: ExifSection,
    pub gps: GpsSection,
}

// ============================================================================
// Shaping
// ============================================================================

/// Five representative fields, each with a placeholder when absent
pub fn summarize(raw: &RawMetadata) -> Vec<SummaryRow> {
    let text = |name: &str| raw.get(name).map(|v| v.to_string());

    let timestamp = text("DateTimeOriginal")
        .or_else(|| text("DateTime"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let width = text("PixelXDimension")
        .or_else(|| text("ImageWidth"))
        .unwrap_or_else(|| UNKNOWN_DIMENSION.to_string());
    let height = text("PixelYDimension")
        .or_else(|| text("ImageLength"))
        .unwrap_or_else(|| UNKNOWN_DIMENSION.to_string());

    vec![
        SummaryRow::new("Make", text("Make").unwrap_or_else(|| UNKNOWN.to_string())),
        SummaryRow::new("Model", text("Model").unwrap_or_else(|| UNKNOWN.to_string())),
        SummaryRow::new("Software", text("Software").unwrap_or_else(|| NOT_AVAILABLE.to_string())),
        SummaryRow::new("Original date/time", timestamp),
        SummaryRow::new("Dimensions", format!("{} x {}", width, height)),
    ]
}

/// Stringified tags shorter than `limit` characters
pub fn raw_view(raw: &RawMetadata, limit: usize) -> BTreeMap<String, String> {
    raw.iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .filter(|(_, v)| v.chars().count() < limit)
        .collect()
}

/// Section for a decoded EXIF block
pub fn exif_section(tables: &ExifTables, config: &InspectorConfig) -> ExifSection {
    if tables.raw.is_empty() {
        return ExifSection::Empty;
    }
    ExifSection::Present {
        summary: summarize(&tables.raw),
        raw: raw_view(&tables.raw, config.raw_value_limit),
    }
}

/// Resolve the GPS display state
pub fn gps_section(gps: Option<&GpsMetadata>, config: &InspectorConfig) -> GpsSection {
    let gps = match gps {
        Some(gps) if !gps.is_empty() => gps,
        _ => return GpsSection::NoGpsBlock,
    };

    match extract_coordinate(gps) {
        Ok(coordinate) => GpsSection::CoordinatesFound {
            coordinate,
            maps_url: maps_search_url(&config.maps_search_url, coordinate),
            map: MapView::new(coordinate, config.map_zoom),
        },
        Err(e) => GpsSection::GpsBlockIncomplete { reason: e.to_string() },
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Terminal rendering: tables and status lines
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Evidence: {}", self.file_name);
        if let Some(content_type) = &self.content_type {
            let _ = writeln!(out, "Content type: {}", content_type);
        }
        if let Some(d) = &self.pixel_dimensions {
            let _ = writeln!(out, "Pixels: {} x {}", d.width, d.height);
        }
        out.push('\n');

        out.push_str("== Technical analysis ==\n");
        match &self.exif {
            ExifSection::Present { summary, raw } => {
                out.push_str(&summary_table(summary));
                let _ = writeln!(out, "\nRaw data ({} fields):", raw.len());
                let json = serde_json::to_string_pretty(raw).unwrap_or_default();
                out.push_str(&json);
                out.push('\n');
            }
            ExifSection::Empty | ExifSection::Missing => {
                let _ = writeln!(out, "WARNING: {}", MSG_NO_EXIF);
            }
            ExifSection::Error { message } => {
                let _ = writeln!(out, "ERROR: Extraction failed: {}", message);
            }
        }
        out.push('\n');

        out.push_str("== Location tracking ==\n");
        match &self.gps {
            GpsSection::NotInspected => {
                let _ = writeln!(out, "{}", MSG_GPS_NOT_INSPECTED);
            }
            GpsSection::NoGpsBlock => {
                let _ = writeln!(out, "{}", MSG_NO_GPS);
            }
            GpsSection::GpsBlockIncomplete { reason } => {
                let _ = writeln!(out, "WARNING: {} ({})", MSG_GPS_INCOMPLETE, reason);
            }
            GpsSection::CoordinatesFound { coordinate, maps_url, .. } => {
                let _ = writeln!(
                    out,
                    "Coordinates found: {}, {}",
                    coordinate.latitude, coordinate.longitude
                );
                let _ = writeln!(out, "{}", MSG_SHUTTER);
                let _ = writeln!(out, "Open in Google Maps: {}", maps_url);
            }
        }

        let _ = writeln!(out, "\n{}", MSG_TIP);
        out
    }

    /// Standalone page; the map is drawn client-side by Leaflet
    pub fn to_html(&self) -> String {
        let mut body = String::new();

        let _ = writeln!(body, "<h1>EXIF trail: {}</h1>", escape_html(&self.file_name));
        let _ = writeln!(body, "<p class=\"tip\">{}</p>", escape_html(MSG_TIP));

        body.push_str("<h2>Technical analysis</h2>\n");
        match &self.exif {
            ExifSection::Present { summary, raw } => {
                body.push_str("<table>\n<tr><th>Property</th><th>Value</th></tr>\n");
                for row in summary {
                    let _ = writeln!(
                        body,
                        "<tr><td>{}</td><td>{}</td></tr>",
                        escape_html(&row.property),
                        escape_html(&row.value)
                    );
                }
                body.push_str("</table>\n");
                let json = serde_json::to_string_pretty(raw).unwrap_or_default();
                let _ = writeln!(
                    body,
                    "<details><summary>All raw data (advanced)</summary><pre>{}</pre></details>",
                    escape_html(&json)
                );
            }
            ExifSection::Empty | ExifSection::Missing => {
                let _ = writeln!(body, "<p class=\"warning\">{}</p>", escape_html(MSG_NO_EXIF));
            }
            ExifSection::Error { message } => {
                let _ = writeln!(
                    body,
                    "<p class=\"error\">Extraction failed: {}</p>",
                    escape_html(message)
                );
            }
        }

        body.push_str("<h2>Location tracking</h2>\n");
        let mut head_extra = String::new();
        match &self.gps {
            GpsSection::NotInspected => {
                let _ = writeln!(body, "<p class=\"warning\">{}</p>", escape_html(MSG_GPS_NOT_INSPECTED));
            }
            GpsSection::NoGpsBlock => {
                let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(MSG_NO_GPS));
            }
            GpsSection::GpsBlockIncomplete { reason } => {
                let _ = writeln!(
                    body,
                    "<p class=\"warning\">{} ({})</p>",
                    escape_html(MSG_GPS_INCOMPLETE),
                    escape_html(reason)
                );
            }
            GpsSection::CoordinatesFound { coordinate, maps_url, map } => {
                head_extra = MapView::head_html();
                let _ = writeln!(
                    body,
                    "<p class=\"success\">Coordinates found: {}, {}</p>",
                    coordinate.latitude, coordinate.longitude
                );
                let _ = writeln!(body, "<p>{}</p>", escape_html(MSG_SHUTTER));
                body.push_str(&map.body_html());
                let _ = writeln!(
                    body,
                    "<p><a href=\"{}\">Open in Google Maps</a></p>",
                    escape_html(maps_url)
                );
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>EXIF trail</title>\n{}</head>\n<body>\n{}</body>\n</html>\n",
            head_extra, body
        )
    }
}

fn summary_table(rows: &[SummaryRow]) -> String {
    let width = rows.iter()
        .map(|r| r.property.chars().count())
        .max()
        .unwrap_or(0)
        .max("Property".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$} | Value", "Property", width = width);
    let _ = writeln!(out, "{}-+-{}", "-".repeat(width), "-".repeat(5));
    for row in rows {
        let _ = writeln!(out, "{:<width$} | {}", row.property, row.value, width = width);
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
