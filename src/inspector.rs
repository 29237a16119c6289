//! Single-upload inspection pipeline

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::InspectorConfig;
use crate::error::InspectError;
use crate::metadata::read_exif;
use crate::registry::{StandardRegistry, TagRegistry};
use crate::report::{exif_section, gps_section, ExifSection, GpsSection, Report};
use crate::upload::Upload;

/// Runs one upload through extraction, conversion and report shaping
pub struct Inspector {
    config: InspectorConfig,
    registry: Arc<dyn TagRegistry>,
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self::with_registry(config, Arc::new(StandardRegistry))
    }

    pub fn with_registry(config: InspectorConfig, registry: Arc<dyn TagRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Same registry, different settings
    pub fn reconfigured(&self, config: InspectorConfig) -> Self {
        Self::with_registry(config, Arc::clone(&self.registry))
    }

    /// Build the report for one upload
    ///
    /// Never fails: every error is recovered into the report so the caller
    /// can show it and accept the next upload.
    pub fn inspect(&self, upload: &Upload) -> Report {
        let mut report = Report {
            file_name: upload.file_name().to_string(),
            content_type: None,
            pixel_dimensions: None,
            exif: ExifSection::Missing,
            gps: GpsSection::NoGpsBlock,
        };

        if let Err(e) = upload.check_extension() {
            warn!("Rejected upload: {}", e);
            report.exif = ExifSection::Error { message: e.to_string() };
            report.gps = GpsSection::NotInspected;
            return report;
        }

        report.content_type = upload.sniff_content_type().map(str::to_string);
        report.pixel_dimensions = upload.probe_dimensions();

        match read_exif(upload.bytes(), self.registry.as_ref()) {
            Ok(Some(tables)) => {
                report.exif = exif_section(&tables, &self.config);
                report.gps = gps_section(tables.gps.as_ref(), &self.config);
            }
            Ok(None) => {
                report.exif = ExifSection::Missing;
            }
            Err(e) => {
                warn!("Extraction failed for {}: {}", upload.file_name(), e);
                report.exif = ExifSection::Error { message: e.to_string() };
                report.gps = GpsSection::NotInspected;
            }
        }

        info!(
            "Inspected {}: exif={} gps={}",
            report.file_name,
            exif_status(&report.exif),
            report.gps.state_name()
        );

        report
    }

    /// Read a file from disk and inspect it
    pub fn inspect_path(&self, path: &std::path::Path) -> Result<Report, InspectError> {
        let upload = Upload::from_path(path)?;
        Ok(self.inspect(&upload))
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

fn exif_status(section: &ExifSection) -> &'static str {
    match section {
        ExifSection::Present { .. } => "present",
        ExifSection::Empty => "empty",
        ExifSection::Missing => "missing",
        ExifSection::Error { .. } => "error",
    }
}
