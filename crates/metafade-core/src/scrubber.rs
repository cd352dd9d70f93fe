// File: crates/metafade-core/src/scrubber.rs

//! The read and scrub operations over image handles.
//!
//! Each call is one independent acquire/use/release cycle: nothing is kept
//! open or cached between a display and a later scrub of the same image.

use crate::handle::{ImageHandle, SaveTarget};
use crate::profile::ScrubProfile;
use crate::record::MetadataRecord;
use crate::{MetadataEntry, Result, ScrubResult, container_for_bytes, tiff};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reads the displayed fields of an image.
///
/// Only failing to open the handle is an error. Unsupported formats and
/// unreadable metadata produce an empty record.
pub fn inspect(handle: &ImageHandle) -> Result<MetadataRecord> {
    let bytes = handle.open_read()?.read_all()?;
    Ok(record_from_bytes(bytes))
}

/// [`inspect`] over bytes already in memory.
pub fn record_from_bytes(bytes: Vec<u8>) -> MetadataRecord {
    let container = match container_for_bytes(bytes) {
        Ok(container) => container,
        Err(e) => {
            debug!("No readable metadata: {}", e);
            return MetadataRecord::default();
        }
    };
    let exif = container
        .exif_payload()
        .and_then(|payload| match tiff::parse(payload) {
            Ok(exif) => Some(exif),
            Err(e) => {
                debug!("Ignoring unreadable EXIF payload: {}", e);
                None
            }
        });
    MetadataRecord::from_exif(exif.as_ref(), container.frame_dimensions())
}

/// Every raw EXIF entry of an image, with its IFD category.
pub fn entries(handle: &ImageHandle) -> Result<Vec<MetadataEntry>> {
    let bytes = handle.open_read()?.read_all()?;
    let container = match container_for_bytes(bytes) {
        Ok(container) => container,
        Err(e) => {
            debug!("No readable metadata in {}: {}", handle.path().display(), e);
            return Ok(Vec::new());
        }
    };
    match container.exif_payload().map(tiff::parse) {
        Some(Ok(exif)) => Ok(tiff::entries(&exif)),
        Some(Err(e)) => {
            debug!("Ignoring unreadable EXIF payload: {}", e);
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

/// Applies `profile` to an in-memory file.
pub fn scrub_bytes(file_bytes: Vec<u8>, profile: &ScrubProfile) -> Result<ScrubResult> {
    let container = container_for_bytes(file_bytes)?;
    let exif = container.exif_payload().map(tiff::parse).transpose()?;
    let rewrite = tiff::rewrite(exif.as_ref(), profile)?;
    let cleaned_file_bytes = container.with_exif(rewrite.payload.as_deref())?;
    Ok(ScrubResult {
        cleaned_file_bytes,
        metadata_removed: rewrite.cleared,
    })
}

/// What a successful scrub-and-save did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubReport {
    pub handle: ImageHandle,
    pub saved_to: PathBuf,
    pub metadata_removed: Vec<MetadataEntry>,
    pub bytes_written: usize,
}

/// Clears the profile's fields and durably saves the result.
///
/// Nothing is written unless the whole rewrite succeeds, and the save itself
/// replaces the file atomically.
pub fn scrub_and_save(
    handle: &ImageHandle,
    profile: &ScrubProfile,
    target: SaveTarget,
) -> Result<ScrubReport> {
    let (result, saved_to) = match target {
        SaveTarget::InPlace => {
            let mut guard = handle.open_write()?;
            let result = scrub_bytes(guard.read_all()?, profile)?;
            let saved_to = guard.commit(&result.cleaned_file_bytes, target)?;
            (result, saved_to)
        }
        // The original is only read, so it may be read-only.
        SaveTarget::CleanCopy => {
            let mut guard = handle.open_read()?;
            let result = scrub_bytes(guard.read_all()?, profile)?;
            let saved_to = guard.save_copy(&result.cleaned_file_bytes)?;
            (result, saved_to)
        }
    };
    info!(
        "Removed {} metadata entries from {}",
        result.metadata_removed.len(),
        handle.path().display()
    );
    Ok(ScrubReport {
        handle: handle.clone(),
        saved_to,
        metadata_removed: result.metadata_removed,
        bytes_written: result.cleaned_file_bytes.len(),
    })
}

/// Scrubs each handle in turn. A failure only affects its own item.
pub fn scrub_all(
    handles: &[ImageHandle],
    profile: &ScrubProfile,
    target: SaveTarget,
) -> Vec<(ImageHandle, Result<ScrubReport>)> {
    handles
        .iter()
        .map(|handle| {
            let result = scrub_and_save(handle, profile, target);
            if let Err(e) = &result {
                warn!("Could not scrub {}: {}", handle.path().display(), e);
            }
            (handle.clone(), result)
        })
        .collect()
}
