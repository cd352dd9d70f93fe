// File: crates/metafade-core/src/picker.rs

//! The single-shot request/response contract with an image picker.

use crate::handle::ImageHandle;
use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickMode {
    Single,
    Multiple,
}

/// Which resources a picker may hand back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFilter {
    #[default]
    ImageOnly,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "jpe", "png", "webp", "heic", "heif", "tif", "tiff", "gif", "bmp", "dng", "avif",
];

impl MediaFilter {
    pub fn accepts(self, handle: &ImageHandle) -> bool {
        match self {
            MediaFilter::ImageOnly => handle
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    IMAGE_EXTENSIONS
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(ext))
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRequest {
    pub mode: PickMode,
    pub filter: MediaFilter,
}

impl PickRequest {
    pub fn images(mode: PickMode) -> Self {
        Self {
            mode,
            filter: MediaFilter::ImageOnly,
        }
    }
}

/// What the picker delivered. Exactly one outcome per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickOutcome {
    Cancelled,
    Single(ImageHandle),
    Multiple(Vec<ImageHandle>),
}

impl PickOutcome {
    /// Builds the outcome for `request` from whatever the user chose,
    /// dropping anything the filter rejects. Nothing left means cancelled.
    pub fn from_handles(request: PickRequest, handles: Vec<ImageHandle>) -> Self {
        let (accepted, rejected): (Vec<_>, Vec<_>) = handles
            .into_iter()
            .partition(|handle| request.filter.accepts(handle));
        for handle in &rejected {
            debug!("Picker filter rejected {}", handle.path().display());
        }

        match request.mode {
            PickMode::Single => accepted
                .into_iter()
                .next()
                .map_or(PickOutcome::Cancelled, PickOutcome::Single),
            PickMode::Multiple if accepted.is_empty() => PickOutcome::Cancelled,
            PickMode::Multiple => PickOutcome::Multiple(accepted),
        }
    }
}

/// A source of image handles.
///
/// The caller is suspended until the user picks or cancels; no other event
/// is processed in between.
pub trait Picker {
    fn pick(&mut self, request: PickRequest) -> impl Future<Output = PickOutcome>;
}
