//! Tag name lookup
//!
//! EXIF fields carry numeric identifiers scoped by IFD context. The reader
//! resolves them through a [`TagRegistry`] so the name tables stay an
//! injected, read-only capability instead of a global.

use exif::{Context, Tag};

/// Resolves `(context, tag number)` pairs to canonical tag names
pub trait TagRegistry: Send + Sync {
    /// Canonical name, or `None` when the pair is not in the table
    fn resolve(&self, context: Context, number: u16) -> Option<String>;

    /// Canonical name, falling back to the decimal tag number
    fn name_of(&self, context: Context, number: u16) -> String {
        self.resolve(context, number)
            .unwrap_or_else(|| number.to_string())
    }
}

/// Registry backed by kamadak-exif's built-in tag table
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRegistry;

impl TagRegistry for StandardRegistry {
    fn resolve(&self, context: Context, number: u16) -> Option<String> {
        let tag = Tag(context, number);
        // Only tags with a table entry have a description; unknown tags
        // display as a debug tuple, which we don't want as a key.
        tag.description().map(|_| tag.to_string())
    }
}
