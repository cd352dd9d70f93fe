// File: crates/metafade-core/src/fixtures.rs

//! Byte-level images shared by the unit tests.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;

/// A 1x1 pixel JPEG without any APP1 segment.
pub const JPEG_WITHOUT_EXIF: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x01, 0x00, 0x01,
    0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xC4, 0x00, 0x1F, 0x00,
    0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0xFF, 0xDA,
    0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00, 0xF7, 0xC8, 0xFF,
    0xD9,
];

pub fn plain_jpeg() -> Vec<u8> {
    JPEG_WITHOUT_EXIF.to_vec()
}

/// A 1x1 RGBA PNG with a tEXt chunk. Keyword: "Author", Text: "MetaFade Tester"
pub fn plain_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(Cursor::new(&mut bytes), 1, 1);
        encoder.set_color(::png::ColorType::Rgba);
        encoder.set_depth(::png::BitDepth::Eight);
        encoder
            .add_text_chunk("Author".to_string(), "MetaFade Tester".to_string())
            .unwrap();
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[10, 20, 30, 255]).unwrap();
    }
    bytes
}

fn ascii(tag: Tag, ifd_num: In, text: &str) -> Field {
    Field {
        tag,
        ifd_num,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn rationals(tag: Tag, parts: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            parts
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

/// Every field of the clear-list plus the technical fields a scrub keeps,
/// and a GPS block pointing at Paris.
pub fn camera_fields() -> Vec<Field> {
    let p = In::PRIMARY;
    vec![
        Field {
            tag: Tag::ImageWidth,
            ifd_num: p,
            value: Value::Long(vec![4000]),
        },
        Field {
            tag: Tag::ImageLength,
            ifd_num: p,
            value: Value::Long(vec![3000]),
        },
        ascii(Tag::ImageDescription, p, "Holiday"),
        ascii(Tag::Make, p, "Canon"),
        ascii(Tag::Model, p, "EOS 5D"),
        ascii(Tag::Software, p, "Firmware 1.1"),
        ascii(Tag::DateTime, p, "2023:06:15 14:30:00"),
        ascii(Tag::Artist, p, "Jane Doe"),
        ascii(Tag::Copyright, p, "(c) Jane Doe"),
        Field {
            tag: Tag::ExifVersion,
            ifd_num: p,
            value: Value::Undefined(b"0232".to_vec(), 0),
        },
        ascii(Tag::DateTimeOriginal, p, "2023:06:15 14:30:00"),
        ascii(Tag::DateTimeDigitized, p, "2023:06:15 14:30:01"),
        Field {
            tag: Tag::Flash,
            ifd_num: p,
            value: Value::Short(vec![0x19]),
        },
        Field {
            tag: Tag::MakerNote,
            ifd_num: p,
            value: Value::Undefined(vec![1, 2, 3, 4], 0),
        },
        Field {
            tag: Tag::UserComment,
            ifd_num: p,
            value: Value::Undefined(b"ASCII\0\0\0hello".to_vec(), 0),
        },
        ascii(Tag::RelatedSoundFile, p, "SND00001.WAV"),
        Field {
            tag: Tag::FileSource,
            ifd_num: p,
            value: Value::Undefined(vec![3], 0),
        },
        Field {
            tag: Tag::DeviceSettingDescription,
            ifd_num: p,
            value: Value::Undefined(vec![0, 0, 0, 0], 0),
        },
        ascii(Tag::ImageUniqueID, p, "0123456789abcdef0123456789abcdef"),
        ascii(Tag::CameraOwnerName, p, "Jane Doe"),
        ascii(Tag::BodySerialNumber, p, "SN-1234"),
        rationals(Tag::LensSpecification, &[(24, 1), (70, 1), (28, 10), (28, 10)]),
        ascii(Tag::LensMake, p, "Canon"),
        ascii(Tag::LensModel, p, "EF24-70mm f/2.8L"),
        ascii(Tag::LensSerialNumber, p, "LS-42"),
        Field {
            tag: Tag::GPSVersionID,
            ifd_num: p,
            value: Value::Byte(vec![2, 2, 0, 0]),
        },
        ascii(Tag::GPSLatitudeRef, p, "N"),
        rationals(Tag::GPSLatitude, &[(48, 1), (51, 1), (2376, 100)]),
        ascii(Tag::GPSLongitudeRef, p, "W"),
        rationals(Tag::GPSLongitude, &[(2, 1), (21, 1), (768, 100)]),
        rationals(Tag::GPSAltitude, &[(35, 1)]),
    ]
}

/// Serializes `fields` into a big-endian TIFF payload.
pub fn tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, false).unwrap();
    out.into_inner()
}

/// `JPEG_WITHOUT_EXIF` with an `Exif\0\0` APP1 segment right after SOI.
pub fn jpeg_with_exif(payload: &[u8]) -> Vec<u8> {
    let length = (2 + 6 + payload.len()) as u16;
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1];
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&JPEG_WITHOUT_EXIF[2..]);
    bytes
}

/// A 2x1 RGB PNG with `payload` stored in an eXIf chunk.
pub fn png_with_exif(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(Cursor::new(&mut bytes), 2, 1);
        encoder.set_color(::png::ColorType::Rgb);
        encoder.set_depth(::png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_chunk(::png::chunk::ChunkType(*b"eXIf"), payload)
            .unwrap();
        writer.write_image_data(&[255, 0, 0, 0, 0, 255]).unwrap();
    }
    bytes
}

pub fn camera_jpeg() -> Vec<u8> {
    jpeg_with_exif(&tiff(&camera_fields()))
}

/// `png_with_exif` with colour, density and text chunks ahead of the eXIf.
pub fn tagged_png(payload: &[u8]) -> Vec<u8> {
    let chunk = |kind: &[u8; 4]| ::png::chunk::ChunkType(*kind);
    // 2835 pixels per metre in both directions
    let density: [u8; 9] = [0, 0, 0x0B, 0x13, 0, 0, 0x0B, 0x13, 1];
    // Profile "icc", deflate, zlib stream of an empty profile
    let profile = b"icc\0\0\x78\x9C\x03\x00\x00\x00\x00\x01";

    let mut bytes = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(Cursor::new(&mut bytes), 2, 1);
        encoder.set_color(::png::ColorType::Rgb);
        encoder.set_depth(::png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_chunk(chunk(b"pHYs"), &density).unwrap();
        writer.write_chunk(chunk(b"sRGB"), &[0]).unwrap();
        writer.write_chunk(chunk(b"iCCP"), profile).unwrap();
        writer.write_chunk(chunk(b"tEXt"), b"Author\0Jane Doe").unwrap();
        writer.write_chunk(chunk(b"eXIf"), payload).unwrap();
        writer.write_image_data(&[255, 0, 0, 0, 0, 255]).unwrap();
    }
    bytes
}
