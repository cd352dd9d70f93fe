// File: crates/metafade-core/src/tiff.rs

//! The TIFF structure inside an EXIF payload: parsing, listing and rewriting.

use crate::profile::{GpsPolicy, ScrubProfile};
use crate::{MetadataEntry, Result};
use exif::experimental::Writer;
use exif::{Context, Exif, Field, In, Rational, Tag, Value};
use log::{debug, warn};
use std::io::Cursor;

/// Parses a raw TIFF payload.
pub fn parse(payload: &[u8]) -> Result<Exif> {
    Ok(exif::Reader::new().read_raw(payload.to_vec())?)
}

fn category(field: &Field) -> String {
    match field.tag.context() {
        Context::Tiff if field.ifd_num == In::PRIMARY => "IFD0".to_string(),
        Context::Tiff if field.ifd_num == In::THUMBNAIL => "IFD1".to_string(),
        Context::Tiff => format!("IFD{}", field.ifd_num.index()),
        Context::Exif => "EXIF".to_string(),
        Context::Gps => "GPS".to_string(),
        Context::Interop => "Interop".to_string(),
        _ => "Unknown".to_string(),
    }
}

fn entry(exif: &Exif, field: &Field) -> MetadataEntry {
    MetadataEntry {
        key: field.tag.to_string(),
        value: field.display_value().with_unit(exif).to_string(),
        category: category(field),
    }
}

/// Every entry in the payload, in file order.
pub fn entries(exif: &Exif) -> Vec<MetadataEntry> {
    exif.fields().map(|field| entry(exif, field)).collect()
}

/// Tags describing the layout of the payload itself. The writer recreates
/// them, so they are never copied over.
const STRUCTURAL: &[Tag] = &[
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::TileOffsets,
    Tag::TileByteCounts,
];

/// The JPEG thumbnail stored after IFD1, if any.
fn thumbnail_jpeg(exif: &Exif) -> Option<&[u8]> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let len = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    exif.buf().get(offset..offset.checked_add(len)?)
}

fn zero_gps_fields() -> Vec<Field> {
    let zero = vec![Rational { num: 0, denom: 1 }; 3];
    let ascii = |text: &str| Value::Ascii(vec![text.as_bytes().to_vec()]);
    vec![
        Field {
            tag: Tag::GPSVersionID,
            ifd_num: In::PRIMARY,
            value: Value::Byte(vec![2, 2, 0, 0]),
        },
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("N"),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(zero.clone()),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("E"),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(zero),
        },
    ]
}

/// A payload with the profile applied.
#[derive(Debug)]
pub struct Rewrite {
    /// The new payload; `None` when nothing is left worth storing.
    pub payload: Option<Vec<u8>>,
    /// Entries that were present and are gone from `payload`.
    pub cleared: Vec<MetadataEntry>,
}

/// Applies `profile` to `exif` and serializes what survives.
///
/// A missing payload is treated as an empty one, so the zeroed GPS block is
/// still written under [`GpsPolicy::Zero`].
pub fn rewrite(exif: Option<&Exif>, profile: &ScrubProfile) -> Result<Rewrite> {
    let gps = match profile.gps {
        GpsPolicy::Zero => zero_gps_fields(),
        GpsPolicy::Remove => Vec::new(),
    };
    let thumbnail = exif.and_then(thumbnail_jpeg);
    let mut kept: Vec<&Field> = Vec::new();
    let mut cleared = Vec::new();

    if let Some(exif) = exif {
        for field in exif.fields() {
            if STRUCTURAL.contains(&field.tag) {
                continue;
            }
            if field.tag.context() == Context::Gps || profile.clears(field) {
                cleared.push(entry(exif, field));
                continue;
            }
            if field.ifd_num == In::THUMBNAIL && thumbnail.is_none() {
                debug!("Dropping {} from IFD1 without thumbnail data", field.tag);
                cleared.push(entry(exif, field));
                continue;
            }
            if field.ifd_num != In::PRIMARY && field.ifd_num != In::THUMBNAIL {
                debug!("Dropping {} from {}", field.tag, category(field));
                cleared.push(entry(exif, field));
                continue;
            }
            if let Value::Unknown(typ, _, _) = field.value {
                warn!("Dropping {} with unknown value type {}", field.tag, typ);
                cleared.push(entry(exif, field));
                continue;
            }
            kept.push(field);
        }
    }

    kept.extend(gps.iter());

    // IFD1 cannot be written behind an empty IFD0.
    if !kept.iter().any(|field| field.ifd_num == In::PRIMARY) {
        if let Some(exif) = exif {
            cleared.extend(kept.iter().map(|field| entry(exif, field)));
        }
        if thumbnail.is_some() {
            debug!("Dropping the thumbnail, no primary fields are left");
        }
        return Ok(Rewrite {
            payload: None,
            cleared,
        });
    }

    kept.sort_by_key(|field| (field.ifd_num.index(), field.tag.number()));

    let mut writer = Writer::new();
    for field in kept.iter().copied() {
        writer.push_field(field);
    }
    if let Some(jpeg) = thumbnail {
        writer.set_jpeg(jpeg, In::THUMBNAIL);
    }

    // Keep the byte order of the original; big-endian for new payloads.
    let little_endian = exif.is_some_and(|exif| exif.little_endian());
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, little_endian)?;

    Ok(Rewrite {
        payload: Some(out.into_inner()),
        cleared,
    })
}
