// File: crates/metafade-core/src/png.rs

use crate::{Container, Error, Result};
use log::debug;
use std::io::Cursor;
use std::ops::Range;

/// The 8-byte signature every PNG starts with.
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const EXIF_CHUNK: [u8; 4] = *b"eXIf";
const HEADER_CHUNK: [u8; 4] = *b"IHDR";
const DATA_CHUNK: [u8; 4] = *b"IDAT";
const END_CHUNK: [u8; 4] = *b"IEND";
const TEXT_CHUNKS: &[[u8; 4]] = &[*b"tEXt", *b"zTXt", *b"iTXt"];

/// Some writers keep the JPEG APP1 prefix inside eXIf.
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

struct Chunk<'a> {
    kind: [u8; 4],
    data: &'a [u8],
    /// The whole chunk: length, type, data and CRC.
    span: Range<usize>,
}

/// Walks the chunk list: length (4) | type (4) | data | crc (4).
fn chunks(bytes: &[u8]) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut offset = SIGNATURE.len();
    while offset + 12 <= bytes.len() {
        let mut length = [0u8; 4];
        length.copy_from_slice(&bytes[offset..offset + 4]);
        let length = u32::from_be_bytes(length) as usize;

        let mut kind = [0u8; 4];
        kind.copy_from_slice(&bytes[offset + 4..offset + 8]);

        let data_start = offset + 8;
        let data_end = data_start.saturating_add(length);
        if data_end.saturating_add(4) > bytes.len() {
            debug!("Truncated PNG chunk at offset {}", offset);
            break;
        }

        chunks.push(Chunk {
            kind,
            data: &bytes[data_start..data_end],
            span: offset..data_end + 4,
        });
        if kind == END_CHUNK {
            break;
        }
        offset = data_end + 4;
    }
    chunks
}

/// Serializes a single chunk, CRC included, through the png encoder.
fn encode_chunk(kind: [u8; 4], data: &[u8]) -> Result<Vec<u8>> {
    let mut scratch = Vec::new();
    {
        let encoder = ::png::Encoder::new(&mut scratch, 1, 1);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::Parsing(e.to_string()))?;
        writer
            .write_chunk(::png::chunk::ChunkType(kind), data)
            .map_err(|e| Error::Parsing(e.to_string()))?;
    }
    let span = chunks(&scratch)
        .into_iter()
        .find(|chunk| chunk.kind == kind)
        .map(|chunk| chunk.span)
        .ok_or_else(|| Error::Parsing("PNG encoder did not emit the chunk".to_string()))?;
    Ok(scratch[span].to_vec())
}

/// A Container implementation for PNG files.
#[derive(Debug, Clone)]
pub struct PngContainer {
    file_bytes: Vec<u8>,
}

impl Container for PngContainer {
    fn new(file_bytes: Vec<u8>) -> Result<Self> {
        // The png::Decoder will fail if it's not a valid PNG, which is a robust check.
        let decoder = ::png::Decoder::new(Cursor::new(&file_bytes));
        if decoder.read_info().is_err() {
            return Err(Error::UnsupportedFileType(
                "Not a valid PNG file.".to_string(),
            ));
        }
        Ok(Self { file_bytes })
    }

    fn exif_payload(&self) -> Option<&[u8]> {
        let chunk = chunks(&self.file_bytes)
            .into_iter()
            .find(|chunk| chunk.kind == EXIF_CHUNK)?;
        Some(chunk.data.strip_prefix(EXIF_HEADER).unwrap_or(chunk.data))
    }

    fn frame_dimensions(&self) -> Option<(u32, u32)> {
        let header = chunks(&self.file_bytes)
            .into_iter()
            .find(|chunk| chunk.kind == HEADER_CHUNK)?;
        let data = header.data;
        if data.len() < 8 {
            return None;
        }
        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        Some((width, height))
    }

    /// Copies every chunk byte for byte except eXIf and the text chunks.
    /// The new eXIf goes right before the first IDAT.
    fn with_exif(&self, payload: Option<&[u8]>) -> Result<Vec<u8>> {
        let chunks = chunks(&self.file_bytes);
        if chunks.last().map(|chunk| chunk.kind) != Some(END_CHUNK) {
            return Err(Error::Parsing("PNG chunk list is truncated".to_string()));
        }

        let mut exif_chunk = payload
            .map(|payload| encode_chunk(EXIF_CHUNK, payload))
            .transpose()?;

        let mut cleaned_bytes = Vec::with_capacity(self.file_bytes.len());
        cleaned_bytes.extend_from_slice(&SIGNATURE);
        for chunk in &chunks {
            if chunk.kind == EXIF_CHUNK || TEXT_CHUNKS.contains(&chunk.kind) {
                debug!("Dropping {} chunk", String::from_utf8_lossy(&chunk.kind));
                continue;
            }
            if chunk.kind == DATA_CHUNK || chunk.kind == END_CHUNK {
                if let Some(exif_chunk) = exif_chunk.take() {
                    cleaned_bytes.extend_from_slice(&exif_chunk);
                }
            }
            cleaned_bytes.extend_from_slice(&self.file_bytes[chunk.span.clone()]);
        }
        Ok(cleaned_bytes)
    }
}
