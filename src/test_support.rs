//! JPEG fixtures for unit tests

use std::io::Cursor;

use exif::{Field, In, Tag, Value};

/// SOI immediately followed by EOI: a JPEG stream with no APP1 segment
pub const BARE_JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xd9];

pub fn field(tag: Tag, value: Value) -> Field {
    Field { tag, ifd_num: In::PRIMARY, value }
}

pub fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

pub fn rationals(parts: &[(u32, u32)]) -> Value {
    Value::Rational(
        parts.iter()
            .map(|&(num, denom)| exif::Rational { num, denom })
            .collect(),
    )
}

/// Encode fields as TIFF and wrap them in a minimal JPEG APP1 segment
pub fn jpeg_with_fields(fields: &[Field]) -> Vec<u8> {
    let mut writer = exif::experimental::Writer::new();
    for f in fields {
        writer.push_field(f);
    }

    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("encode EXIF fixture");
    let tiff = tiff.into_inner();

    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}

/// Fields of a photo taken at 40°26'46" N, 79°58'56" W
pub fn pittsburgh_fields() -> Vec<Field> {
    vec![
        field(Tag::Make, ascii("Canon")),
        field(Tag::Model, ascii("Canon EOS 80D")),
        field(Tag::Software, ascii("Firmware 1.0.2")),
        field(Tag::DateTime, ascii("2023:06:02 08:00:00")),
        field(Tag::DateTimeOriginal, ascii("2023:06:01 12:30:00")),
        field(Tag::PixelXDimension, Value::Long(vec![6000])),
        field(Tag::PixelYDimension, Value::Long(vec![4000])),
        field(Tag::GPSLatitudeRef, ascii("N")),
        field(Tag::GPSLatitude, rationals(&[(40, 1), (26, 1), (46, 1)])),
        field(Tag::GPSLongitudeRef, ascii("W")),
        field(Tag::GPSLongitude, rationals(&[(79, 1), (58, 1), (56, 1)])),
    ]
}
