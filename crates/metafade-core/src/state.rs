// File: crates/metafade-core/src/state.rs

//! Application state and the reducer that drives it.
//!
//! All state lives in [`AppState`] and changes only through
//! [`AppState::update`]. Effects (picking, scrubbing) are returned as
//! [`Command`]s for the runtime to execute, and their results come back in
//! as events.

use crate::handle::ImageHandle;
use crate::picker::{PickMode, PickOutcome, PickRequest};
use crate::scrubber::ScrubReport;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One image in the current selection, with its view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedImage {
    pub handle: ImageHandle,
    pub metadata_expanded: bool,
    /// Why the last scrub of this image failed.
    pub last_error: Option<String>,
}

impl SelectedImage {
    fn new(handle: ImageHandle, metadata_expanded: bool) -> Self {
        Self {
            handle,
            metadata_expanded,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Single(SelectedImage),
    Multiple(Vec<SelectedImage>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub selection: Selection,
}

/// The result of scrubbing one image, as fed back to the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubOutcome {
    pub handle: ImageHandle,
    pub cleared: usize,
    pub error: Option<String>,
}

impl ScrubOutcome {
    pub fn from_result(handle: ImageHandle, result: &crate::Result<ScrubReport>) -> Self {
        match result {
            Ok(report) => Self {
                handle,
                cleared: report.metadata_removed.len(),
                error: None,
            },
            Err(e) => Self {
                handle,
                cleared: 0,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RequestPick(PickMode),
    PickerResolved(PickOutcome),
    /// Index into the current selection.
    ToggleMetadata(usize),
    Clear,
    Proceed,
    ScrubFinished(Vec<ScrubOutcome>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Pick(PickRequest),
    Scrub(Vec<ImageHandle>),
}

impl AppState {
    pub fn update(&mut self, event: Event) -> Option<Command> {
        debug!("Handling {:?}", event);
        match event {
            Event::RequestPick(mode) => Some(Command::Pick(PickRequest::images(mode))),
            Event::PickerResolved(outcome) => {
                self.resolve_pick(outcome);
                None
            }
            Event::ToggleMetadata(index) => {
                if let Some(item) = self.items_mut().get_mut(index) {
                    item.metadata_expanded = !item.metadata_expanded;
                }
                None
            }
            Event::Clear => {
                self.selection = Selection::None;
                None
            }
            Event::Proceed => {
                let handles: Vec<_> = self.items().iter().map(|item| item.handle.clone()).collect();
                if handles.is_empty() {
                    None
                } else {
                    Some(Command::Scrub(handles))
                }
            }
            Event::ScrubFinished(outcomes) => {
                self.finish_scrub(outcomes);
                None
            }
        }
    }

    fn resolve_pick(&mut self, outcome: PickOutcome) {
        self.selection = match outcome {
            PickOutcome::Cancelled => return,
            PickOutcome::Single(handle) => Selection::Single(SelectedImage::new(handle, true)),
            PickOutcome::Multiple(handles) if handles.is_empty() => return,
            PickOutcome::Multiple(handles) => Selection::Multiple(
                handles
                    .into_iter()
                    .map(|handle| SelectedImage::new(handle, false))
                    .collect(),
            ),
        };
    }

    /// Drops the items that were scrubbed and records errors on the rest.
    fn finish_scrub(&mut self, outcomes: Vec<ScrubOutcome>) {
        let error_for = |handle: &ImageHandle| {
            outcomes
                .iter()
                .find(|outcome| &outcome.handle == handle)
                .map(|outcome| outcome.error.clone())
        };

        let mut remaining: Vec<SelectedImage> = Vec::new();
        for mut item in self.items().to_vec() {
            match error_for(&item.handle) {
                Some(None) => continue,
                Some(Some(error)) => {
                    warn!("{} stays selected: {}", item.handle.label(), error);
                    item.last_error = Some(error);
                }
                None => {}
            }
            remaining.push(item);
        }

        let was_single = matches!(self.selection, Selection::Single(_));
        self.selection = match remaining.pop() {
            None => Selection::None,
            Some(item) if was_single => Selection::Single(item),
            Some(item) => {
                remaining.push(item);
                Selection::Multiple(remaining)
            }
        };
    }

    pub fn items(&self) -> &[SelectedImage] {
        match &self.selection {
            Selection::None => &[],
            Selection::Single(item) => std::slice::from_ref(item),
            Selection::Multiple(items) => items,
        }
    }

    fn items_mut(&mut self) -> &mut [SelectedImage] {
        match &mut self.selection {
            Selection::None => &mut [],
            Selection::Single(item) => std::slice::from_mut(item),
            Selection::Multiple(items) => items,
        }
    }

    pub fn expanded_flags(&self) -> Vec<bool> {
        self.items().iter().map(|item| item.metadata_expanded).collect()
    }
}
