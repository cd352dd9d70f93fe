// File: crates/metafade-core/src/lib.rs

pub mod handle;
pub mod jpeg;
pub mod picker;
pub mod png;
pub mod profile;
pub mod record;
pub mod scrubber;
pub mod state;
pub mod tiff;
pub mod view;

use crate::jpeg::JpegContainer;
use crate::png::PngContainer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use handle::{ImageHandle, SaveTarget};
pub use picker::{MediaFilter, PickMode, PickOutcome, PickRequest, Picker};
pub use profile::{GpsPolicy, ScrubProfile};
pub use record::MetadataRecord;
pub use scrubber::{ScrubReport, entries, inspect, scrub_all, scrub_and_save, scrub_bytes};
pub use state::{AppState, Command, Event, ScrubOutcome, SelectedImage, Selection};
pub use view::{FileInspector, Inspector, ItemBody, ItemView, Screen, render};

/// A universal error type for all metadata operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File parsing failed: {0}")]
    Parsing(String),

    #[error("Cannot open {}: {source}", path.display())]
    Handle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("EXIF payload of {0} bytes does not fit in a single APP1 segment")]
    SegmentTooLarge(usize),

    #[error("Failed to save {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a single piece of metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
    pub category: String, // "IFD0", "IFD1", "EXIF", "GPS", "Interop"
}

/// The result of a successful scrub operation.
#[derive(Debug)]
pub struct ScrubResult {
    /// The bytes of the new, cleaned file.
    pub cleaned_file_bytes: Vec<u8>,
    /// A report of the metadata entries that were removed.
    pub metadata_removed: Vec<MetadataEntry>,
}

/// An image file format that can carry an EXIF payload.
///
/// Implementations only deal with where the payload lives inside the file;
/// the payload itself (a TIFF structure) is handled by [`tiff`].
pub trait Container {
    /// Creates a new Container from file bytes.
    /// This will also parse the file to ensure it's valid.
    fn new(file_bytes: Vec<u8>) -> Result<Self>
    where
        Self: Sized;

    /// The raw TIFF-structured EXIF payload, if the file carries one.
    fn exif_payload(&self) -> Option<&[u8]>;

    /// `(width, height)` taken from the image's own frame header.
    fn frame_dimensions(&self) -> Option<(u32, u32)>;

    /// Returns the file re-assembled with `payload` as its only EXIF block.
    /// `None` removes the block entirely.
    fn with_exif(&self, payload: Option<&[u8]>) -> Result<Vec<u8>>;
}

/// Detects the file type and returns the appropriate container.
/// This is the main entry point for consumers of the library.
pub fn container_for_bytes(file_bytes: Vec<u8>) -> Result<Box<dyn Container>> {
    // PNG files start with a specific 8-byte signature.
    if file_bytes.len() > 8 && file_bytes[0..8] == crate::png::SIGNATURE {
        let container = PngContainer::new(file_bytes)?;
        return Ok(Box::new(container));
    }

    // JPEG files start with 0xFFD8.
    if file_bytes.len() > 2 && file_bytes[0..2] == crate::jpeg::SOI {
        let container = JpegContainer::new(file_bytes)?;
        return Ok(Box::new(container));
    }

    Err(Error::UnsupportedFileType(
        "Could not determine file type.".to_string(),
    ))
}

#[cfg(test)]
pub(crate) mod fixtures;
