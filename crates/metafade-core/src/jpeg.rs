// File: crates/metafade-core/src/jpeg.rs

use crate::{Container, Error, Result};
use log::debug;

/// Start-of-image marker every JPEG begins with.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Largest value the 2-byte segment length field can hold.
const MAX_SEGMENT_LENGTH: usize = 0xFFFF;

/// A marker segment located in the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    marker: u8,
    /// Offset of the 0xFF byte that introduces the marker.
    offset: usize,
    /// Total length, including the marker and length bytes.
    len: usize,
}

impl Segment {
    fn end(&self) -> usize {
        self.offset + self.len
    }

    fn data<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.offset + 4..self.end()]
    }
}

/// A Container implementation for JPEG files.
#[derive(Debug, Clone)]
pub struct JpegContainer {
    file_bytes: Vec<u8>,
}

// Private helper functions for JpegContainer
impl JpegContainer {
    /// Walks the header segments up to the start of the scan data.
    fn segments(&self) -> Vec<Segment> {
        let bytes = &self.file_bytes;
        let mut segments = Vec::new();
        let mut offset = 2; // Skip the initial SOI marker (0xFFD8)
        while offset + 4 <= bytes.len() {
            if bytes[offset] != 0xFF {
                debug!("Invalid marker start at offset {}", offset);
                break;
            }

            let marker = bytes[offset + 1];

            // Fill bytes before a marker
            if marker == 0xFF {
                offset += 1;
                continue;
            }

            // Standalone markers (no length field)
            if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
                offset += 2;
                continue;
            }

            // Markers that signify the end of metadata or start of image data
            if marker == 0xD9 || marker == 0xDA {
                break;
            }

            let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;

            // Length must be at least 2 (the length field itself) and not exceed buffer
            if length < 2 || offset + 2 + length > bytes.len() {
                debug!("Corrupt length field at offset {}: {}", offset, length);
                break;
            }

            segments.push(Segment {
                marker,
                offset,
                len: 2 + length,
            });
            offset += 2 + length;
        }
        segments
    }

    /// Finds the EXIF data segment (APP1 starting with "Exif\0\0").
    fn find_exif_segment(&self) -> Option<Segment> {
        self.segments().into_iter().find(|segment| {
            segment.marker == APP1 && segment.data(&self.file_bytes).starts_with(EXIF_HEADER)
        })
    }

    /// Where a new APP1 goes when the file has none: after SOI, or after
    /// a leading APP0 (JFIF) segment.
    fn insertion_point(&self) -> usize {
        match self.segments().first() {
            Some(segment) if segment.marker == APP0 => segment.end(),
            _ => SOI.len(),
        }
    }
}

/// Builds an `Exif\0\0` APP1 segment around a TIFF payload.
fn build_exif_segment(payload: &[u8]) -> Result<Vec<u8>> {
    // Length counts itself, the header and the payload but not the marker.
    let length = 2 + EXIF_HEADER.len() + payload.len();
    if length > MAX_SEGMENT_LENGTH {
        return Err(Error::SegmentTooLarge(payload.len()));
    }

    let mut segment = Vec::with_capacity(2 + length);
    segment.extend_from_slice(&[0xFF, APP1]);
    segment.extend_from_slice(&(length as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(payload);
    Ok(segment)
}

/// SOFn markers carry the frame size; C4 (DHT), C8 (JPG) and CC (DAC) don't.
fn is_start_of_frame(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

impl Container for JpegContainer {
    fn new(file_bytes: Vec<u8>) -> Result<Self> {
        // Basic JPEG check
        if file_bytes.len() < 2 || file_bytes[0..2] != SOI {
            return Err(Error::Parsing("Not a valid JPEG file".into()));
        }
        Ok(Self { file_bytes })
    }

    fn exif_payload(&self) -> Option<&[u8]> {
        let segment = self.find_exif_segment()?;
        Some(&segment.data(&self.file_bytes)[EXIF_HEADER.len()..])
    }

    fn frame_dimensions(&self) -> Option<(u32, u32)> {
        let frame = self
            .segments()
            .into_iter()
            .find(|segment| is_start_of_frame(segment.marker))?;
        // precision (1) | height (2) | width (2)
        let data = frame.data(&self.file_bytes);
        if data.len() < 5 {
            return None;
        }
        let height = u16::from_be_bytes([data[1], data[2]]) as u32;
        let width = u16::from_be_bytes([data[3], data[4]]) as u32;
        Some((width, height))
    }

    fn with_exif(&self, payload: Option<&[u8]>) -> Result<Vec<u8>> {
        let replacement = payload.map(build_exif_segment).transpose()?.unwrap_or_default();
        let (start, end) = match self.find_exif_segment() {
            Some(segment) => (segment.offset, segment.end()),
            None => {
                let at = self.insertion_point();
                (at, at)
            }
        };

        let mut cleaned_bytes =
            Vec::with_capacity(self.file_bytes.len() - (end - start) + replacement.len());
        cleaned_bytes.extend_from_slice(&self.file_bytes[..start]);
        cleaned_bytes.extend_from_slice(&replacement);
        cleaned_bytes.extend_from_slice(&self.file_bytes[end..]);
        Ok(cleaned_bytes)
    }
}
