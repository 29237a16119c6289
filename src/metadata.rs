//! EXIF Metadata Reader
//!
//! Decodes the EXIF block of a JPEG upload with kamadak-exif and splits the
//! primary image's fields into two tables:
//! - **RawMetadata**: every non-GPS tag, keyed by canonical name
//! - **GpsMetadata**: the GPS sub-tags, present only when the image has a GPS block
//!
//! Tag names come from an injected [`TagRegistry`]; numbers the registry
//! cannot resolve are kept as their decimal identifier.
//!
//! ## Example
//!
//! ```rust,ignore
//! use exif_trail::metadata::read_exif;
//! use exif_trail::registry::StandardRegistry;
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! match read_exif(&bytes, &StandardRegistry)? {
//!     Some(tables) => println!("{} tags, gps: {}", tables.raw.len(), tables.has_gps()),
//!     None => println!("no EXIF"),
//! }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use tracing::debug;

use crate::error::{InspectError, Result};
use crate::registry::TagRegistry;

// ============================================================================
// Core Metadata Types
// ============================================================================

/// Tag values keyed by canonical tag name
pub type RawMetadata = BTreeMap<String, TagValue>;

/// GPS sub-tag values keyed by canonical GPS tag name
pub type GpsMetadata = BTreeMap<String, TagValue>;

/// Fraction as stored in EXIF rational fields, signed or unsigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub num: i64,
    pub denom: i64,
}

impl Rational {
    pub fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    /// Decimal value, `None` for a zero denominator
    pub fn to_f64(&self) -> Option<f64> {
        if self.denom == 0 {
            None
        } else {
            Some(self.num as f64 / self.denom as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_f64() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "{}/{}", self.num, self.denom),
        }
    }
}

/// A single tag value: a scalar or a short sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    Text(String),
    Unsigned(Vec<u64>),
    Signed(Vec<i64>),
    Rational(Vec<Rational>),
    Float(Vec<f64>),
    Bytes(Vec<u8>),
}

impl TagValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Number of components
    pub fn len(&self) -> usize {
        match self {
            TagValue::Text(_) => 1,
            TagValue::Unsigned(v) => v.len(),
            TagValue::Signed(v) => v.len(),
            TagValue::Rational(v) => v.len(),
            TagValue::Float(v) => v.len(),
            TagValue::Bytes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn write_seq<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.len() == 1 {
        return write!(f, "{}", items[0]);
    }
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Unsigned(v) => write_seq(f, v),
            TagValue::Signed(v) => write_seq(f, v),
            TagValue::Rational(v) => write_seq(f, v),
            TagValue::Float(v) => write_seq(f, v),
            TagValue::Bytes(v) => {
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&exif::Value> for TagValue {
    fn from(value: &exif::Value) -> Self {
        use exif::Value;

        match value {
            Value::Ascii(parts) => {
                let text = parts.iter()
                    .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                TagValue::Text(text)
            }
            Value::Byte(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::Short(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::Long(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::SByte(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::SShort(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::SLong(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::Rational(v) => TagValue::Rational(
                v.iter().map(|r| Rational::new(r.num as i64, r.denom as i64)).collect()
            ),
            Value::SRational(v) => TagValue::Rational(
                v.iter().map(|r| Rational::new(r.num as i64, r.denom as i64)).collect()
            ),
            Value::Float(v) => TagValue::Float(v.iter().map(|&x| x as f64).collect()),
            Value::Double(v) => TagValue::Float(v.clone()),
            Value::Undefined(v, _) => TagValue::Bytes(v.clone()),
            // Unknown type codes carry no readable payload
            _ => TagValue::Bytes(Vec::new()),
        }
    }
}

/// Metadata tables of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifTables {
    /// All non-GPS tags of the primary image
    pub raw: RawMetadata,

    /// GPS sub-tags; `None` when the image has no GPS block
    pub gps: Option<GpsMetadata>,
}

impl ExifTables {
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.raw.get(name)
    }

    /// True when the GPS block exists and holds at least one sub-tag
    pub fn has_gps(&self) -> bool {
        self.gps.as_ref().is_some_and(|g| !g.is_empty())
    }
}

// ============================================================================
// Metadata Extraction - Main API
// ============================================================================

/// Read and route the EXIF block of an in-memory image
///
/// Returns `Ok(None)` when the container has no EXIF block at all, which is
/// distinct from a block that is present but empty. Structural decode errors
/// propagate as [`InspectError::Decode`].
pub fn read_exif(bytes: &[u8], registry: &dyn TagRegistry) -> Result<Option<ExifTables>> {
    let mut cursor = Cursor::new(bytes);

    let exif_data = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif_data) => exif_data,
        Err(exif::Error::NotFound(container)) => {
            debug!("No EXIF block in {} container", container);
            return Ok(None);
        }
        Err(e) => return Err(InspectError::Decode(e)),
    };

    Ok(Some(route_fields(exif_data.fields(), registry)))
}

/// Partition decoded fields into raw and GPS tables
pub fn route_fields<'a, I>(fields: I, registry: &dyn TagRegistry) -> ExifTables
where
    I: IntoIterator<Item = &'a exif::Field>,
{
    let mut raw = RawMetadata::new();
    let mut gps = GpsMetadata::new();
    let mut gps_block = false;

    for field in fields {
        // Thumbnail IFD repeats names like ImageWidth
        if field.ifd_num != exif::In::PRIMARY {
            continue;
        }

        if field.tag == exif::Tag::GPSInfoIFDPointer {
            gps_block = true;
            continue;
        }

        let exif::Tag(context, number) = field.tag;
        let value = TagValue::from(&field.value);

        let table = if matches!(context, exif::Context::Gps) {
            gps_block = true;
            &mut gps
        } else {
            &mut raw
        };

        // Unresolved numbers can repeat across IFDs; qualify the later one
        let mut name = registry.name_of(context, number);
        if table.contains_key(&name) {
            name = format!("{:?}.{}", context, name);
        }
        table.insert(name, value);
    }

    debug!("Routed {} raw tags, {} GPS tags", raw.len(), gps.len());

    ExifTables {
        raw,
        gps: if gps_block { Some(gps) } else { None },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StandardRegistry;
    use crate::test_support::{ascii, field, jpeg_with_fields, rationals, BARE_JPEG};
    use exif::{Tag, Value};

    #[test]
    fn test_no_exif_block_is_none() {
        let tables = read_exif(BARE_JPEG, &StandardRegistry).unwrap();
        assert!(tables.is_none());
    }

    #[test]
    fn test_not_a_container_is_decode_error() {
        let result = read_exif(b"definitely not an image", &StandardRegistry);
        assert!(matches!(result, Err(InspectError::Decode(_))));
    }

    #[test]
    fn test_exif_without_gps() {
        let fields = vec![
            field(Tag::Make, ascii("Canon")),
            field(Tag::Model, ascii("EOS 5D")),
            field(Tag::DateTimeOriginal, ascii("2023:06:01 12:30:00")),
        ];
        let tables = read_exif(&jpeg_with_fields(&fields), &StandardRegistry)
            .unwrap()
            .unwrap();

        assert_eq!(tables.get("Make"), Some(&TagValue::Text("Canon".to_string())));
        assert_eq!(tables.get("Model").map(|v| v.to_string()), Some("EOS 5D".to_string()));
        assert!(tables.get("DateTimeOriginal").is_some());
        assert!(tables.gps.is_none());
        assert!(!tables.has_gps());
    }

    #[test]
    fn test_gps_tags_are_partitioned() {
        let fields = vec![
            field(Tag::Make, ascii("Apple")),
            field(Tag::GPSLatitudeRef, ascii("N")),
            field(Tag::GPSLatitude, rationals(&[(40, 1), (26, 1), (46, 1)])),
        ];
        let tables = read_exif(&jpeg_with_fields(&fields), &StandardRegistry)
            .unwrap()
            .unwrap();

        let gps = tables.gps.as_ref().unwrap();
        assert_eq!(gps.get("GPSLatitudeRef").and_then(|v| v.as_text()), Some("N"));
        assert!(gps.contains_key("GPSLatitude"));

        for name in tables.raw.keys() {
            assert!(!name.starts_with("GPS"), "GPS tag {} leaked into raw table", name);
        }
        assert!(tables.get("Make").is_some());
    }

    #[test]
    fn test_unknown_tag_keeps_number() {
        struct Empty;
        impl TagRegistry for Empty {
            fn resolve(&self, _: exif::Context, _: u16) -> Option<String> {
                None
            }
        }

        let fields = vec![field(Tag::Make, ascii("Nikon"))];
        let tables = read_exif(&jpeg_with_fields(&fields), &Empty).unwrap().unwrap();
        assert!(tables.raw.contains_key("271"));
    }

    #[test]
    fn test_repeated_unknown_number_is_qualified() {
        let private = |context| exif::Field {
            tag: Tag(context, 65520),
            ifd_num: exif::In::PRIMARY,
            value: Value::Short(vec![7]),
        };
        let fields = vec![private(exif::Context::Tiff), private(exif::Context::Exif)];

        let tables = route_fields(&fields, &StandardRegistry);
        assert_eq!(tables.raw.len(), 2);
        assert_eq!(tables.get("65520"), Some(&TagValue::Unsigned(vec![7])));
        assert!(tables.get("Exif.65520").is_some());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(TagValue::Text("abc".into()).to_string(), "abc");
        assert_eq!(TagValue::Unsigned(vec![4032]).to_string(), "4032");
        assert_eq!(TagValue::Unsigned(vec![2, 2, 0, 0]).to_string(), "(2, 2, 0, 0)");
        assert_eq!(TagValue::Bytes(vec![0x30, 0x32, 0xff]).to_string(), "3032ff");
        assert_eq!(
            TagValue::Rational(vec![Rational::new(40, 1), Rational::new(1, 2), Rational::new(3, 0)]).to_string(),
            "(40, 0.5, 3/0)"
        );
    }

    #[test]
    fn test_value_from_exif() {
        let v = TagValue::from(&Value::Ascii(vec![b"Pixel 7\0".to_vec()]));
        assert_eq!(v, TagValue::Text("Pixel 7".to_string()));

        let v = TagValue::from(&Value::SRational(vec![exif::SRational { num: -1, denom: 3 }]));
        assert_eq!(v, TagValue::Rational(vec![Rational::new(-1, 3)]));

        let v = TagValue::from(&Value::Undefined(vec![1, 2, 3], 0));
        assert_eq!(v.len(), 3);
    }
}
