// File: crates/metafade-core/src/record.rs

use exif::{Exif, In, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fields shown for an image. Every field is optional: a file without
/// EXIF produces a record where everything is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Signed decimal degrees.
    pub lat_long: Option<(f64, f64)>,
    pub image_length: Option<u32>,
    pub image_width: Option<u32>,
    pub image_description: Option<String>,
    pub date_time: Option<String>,
    pub model: Option<String>,
    pub camera_owner_name: Option<String>,
    pub copyright: Option<String>,
    pub exif_version: Option<String>,
    pub flash: Option<String>,
    pub file_source: Option<String>,
}

impl MetadataRecord {
    /// Builds a record from a parsed payload. `frame` is the container's own
    /// `(width, height)`, used when the payload does not carry dimensions.
    pub fn from_exif(exif: Option<&Exif>, frame: Option<(u32, u32)>) -> Self {
        let Some(exif) = exif else {
            return Self {
                image_width: frame.map(|(width, _)| width),
                image_length: frame.map(|(_, height)| height),
                ..Self::default()
            };
        };

        Self {
            lat_long: lat_long(exif),
            image_length: uint(exif, Tag::ImageLength)
                .or_else(|| uint(exif, Tag::PixelYDimension))
                .or(frame.map(|(_, height)| height)),
            image_width: uint(exif, Tag::ImageWidth)
                .or_else(|| uint(exif, Tag::PixelXDimension))
                .or(frame.map(|(width, _)| width)),
            image_description: text(exif, Tag::ImageDescription),
            date_time: text(exif, Tag::DateTime),
            model: text(exif, Tag::Model),
            camera_owner_name: text(exif, Tag::CameraOwnerName),
            copyright: text(exif, Tag::Copyright),
            exif_version: text(exif, Tag::ExifVersion),
            flash: text(exif, Tag::Flash),
            file_source: text(exif, Tag::FileSource),
        }
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

/// ASCII values are returned verbatim; anything else goes through the
/// library's display formatting.
fn text(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(strings) => strings
            .iter()
            .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string())
            .find(|s| !s.is_empty()),
        _ => Some(field.display_value().to_string()),
    }
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative: char) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.is_empty() || parts.iter().any(|part| part.denom == 0) {
        return None;
    }
    let degrees: f64 = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(part, scale)| part.to_f64() / scale)
        .sum();
    let sign = match text(exif, ref_tag) {
        Some(reference) if reference.starts_with(negative) => -1.0,
        _ => 1.0,
    };
    Some(degrees * sign)
}

fn lat_long(exif: &Exif) -> Option<(f64, f64)> {
    let latitude = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'S')?;
    let longitude = coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'W')?;
    Some((latitude, longitude))
}

struct Shown<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Shown<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lat_long {
            Some((latitude, longitude)) => {
                writeln!(f, "Latitude Longitude : {latitude}, {longitude}")?
            }
            None => writeln!(f, "Latitude Longitude : null")?,
        }
        writeln!(f, "Image Length : {}", Shown(&self.image_length))?;
        writeln!(f, "Image Width : {}", Shown(&self.image_width))?;
        writeln!(f, "Image Description : {}", Shown(&self.image_description))?;
        writeln!(f, "Image DateTime : {}", Shown(&self.date_time))?;
        writeln!(f, "Image Model : {}", Shown(&self.model))?;
        writeln!(f, "Camera Owner : {}", Shown(&self.camera_owner_name))?;
        writeln!(f, "Image CopyRight : {}", Shown(&self.copyright))?;
        writeln!(f, "Exif Version : {}", Shown(&self.exif_version))?;
        writeln!(f, "Flash : {}", Shown(&self.flash))?;
        write!(f, "File Source : {}", Shown(&self.file_source))
    }
}
