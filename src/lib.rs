//! exif_trail - EXIF metadata and GPS location inspector for JPEG photos
//!
//! Reads the embedded EXIF block with kamadak-exif, summarizes camera fields,
//! converts GPS degree/minute/second values to decimal degrees and renders a
//! report with a map link. Usable as a library, a CLI, or a Unix-socket daemon.

pub mod config;
pub mod error;
pub mod gps;
pub mod inspector;
pub mod map;
pub mod metadata;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod service;
pub mod upload;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use config::InspectorConfig;
pub use error::{InspectError, Result};
pub use gps::{dms_to_decimal, extract_coordinate, Coordinate, GpsError, Hemisphere};
pub use inspector::Inspector;
pub use metadata::{read_exif, ExifTables, GpsMetadata, RawMetadata, TagValue};
pub use registry::{StandardRegistry, TagRegistry};
pub use report::{ExifSection, GpsSection, Report};
pub use upload::Upload;
