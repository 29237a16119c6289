use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Unsupported file type: {0} (expected .jpg or .jpeg)")]
    UnsupportedExtension(String),

    #[error("EXIF decode failed: {0}")]
    Decode(#[from] exif::Error),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InspectError>;
