//! Uploaded photo handling
//!
//! An [`Upload`] is one file as received: a name and its bytes. Only the
//! `.jpg`/`.jpeg` extension is enforced; the content type is sniffed and
//! pixel dimensions probed for the report, but neither blocks inspection.

use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{InspectError, Result};

pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Pixel dimensions read from the image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    /// Read an upload from disk, keeping only the file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercased extension of the file name
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Reject anything that is not named like a JPEG
    pub fn check_extension(&self) -> Result<()> {
        match self.extension() {
            Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(InspectError::UnsupportedExtension(self.file_name.clone())),
        }
    }

    /// MIME type detected from magic bytes
    ///
    /// A mismatch with the extension is logged and otherwise ignored.
    pub fn sniff_content_type(&self) -> Option<&'static str> {
        let detected = infer::get(&self.bytes).map(|t| t.mime_type());
        match detected {
            Some("image/jpeg") => {}
            Some(other) => warn!("{} is named as a JPEG but looks like {}", self.file_name, other),
            None => warn!("{} has no recognizable image signature", self.file_name),
        }
        detected
    }

    /// Width and height from the image header, if it decodes
    pub fn probe_dimensions(&self) -> Option<Dimensions> {
        let reader = image::ImageReader::new(Cursor::new(self.bytes.as_slice()))
            .with_guessed_format()
            .ok()?;

        match reader.into_dimensions() {
            Ok((width, height)) => {
                debug!("{} is {}x{}", self.file_name, width, height);
                Some(Dimensions { width, height })
            }
            Err(e) => {
                warn!("Could not read dimensions of {}: {}", self.file_name, e);
                None
            }
        }
    }
}
