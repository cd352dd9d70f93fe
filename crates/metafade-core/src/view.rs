// File: crates/metafade-core/src/view.rs

//! Turns the application state into a screen description.

use crate::handle::ImageHandle;
use crate::record::MetadataRecord;
use crate::scrubber;
use crate::state::{AppState, Selection};
use serde::Serialize;
use std::fmt;

/// Read-only access to an image's metadata, for rendering.
pub trait Inspector {
    fn inspect(&self, handle: &ImageHandle) -> crate::Result<MetadataRecord>;
}

/// Reads metadata straight from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInspector;

impl Inspector for FileInspector {
    fn inspect(&self, handle: &ImageHandle) -> crate::Result<MetadataRecord> {
        scrubber::inspect(handle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemBody {
    /// Metadata hidden; the item offers "show metadata".
    Collapsed,
    Metadata(MetadataRecord),
    /// The image could not be read.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub index: usize,
    pub label: String,
    pub body: ItemBody,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Home { title: String, prompt: String },
    Gallery { items: Vec<ItemView> },
}

pub const TITLE: &str = "MetaFade";
pub const PROMPT: &str = "Pick one image or several to remove their metadata.";

/// Builds the screen for `state`. Metadata of expanded items is read fresh
/// on every call.
pub fn render(state: &AppState, inspector: &impl Inspector) -> Screen {
    if state.selection == Selection::None {
        return Screen::Home {
            title: TITLE.to_string(),
            prompt: PROMPT.to_string(),
        };
    }

    let items = state
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let body = if item.metadata_expanded {
                match inspector.inspect(&item.handle) {
                    Ok(record) => ItemBody::Metadata(record),
                    Err(e) => ItemBody::Unavailable {
                        reason: e.to_string(),
                    },
                }
            } else {
                ItemBody::Collapsed
            };
            ItemView {
                index,
                label: item.handle.label(),
                body,
                last_error: item.last_error.clone(),
            }
        })
        .collect();
    Screen::Gallery { items }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Home { title, prompt } => {
                writeln!(f, "{title}")?;
                writeln!(f, "{prompt}")?;
                write!(f, "[single] [multiple]")
            }
            Screen::Gallery { items } => {
                for item in items {
                    writeln!(f, "{item}")?;
                }
                write!(f, "[clear] [proceed]")
            }
        }
    }
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {}", self.index + 1, self.label)?;
        if let Some(error) = &self.last_error {
            writeln!(f, "  scrub failed: {error}")?;
        }
        match &self.body {
            ItemBody::Collapsed => write!(f, "  [show metadata]"),
            ItemBody::Unavailable { reason } => write!(f, "  metadata unavailable: {reason}"),
            ItemBody::Metadata(record) => {
                let text = record.to_string();
                let mut lines = text.lines().peekable();
                while let Some(line) = lines.next() {
                    write!(f, "  {line}")?;
                    if lines.peek().is_some() {
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::picker::PickOutcome;
    use crate::state::Event;
    use std::cell::RefCell;
    use std::io;

    #[derive(Default)]
    struct CountingInspector {
        calls: RefCell<Vec<ImageHandle>>,
    }

    impl Inspector for CountingInspector {
        fn inspect(&self, handle: &ImageHandle) -> crate::Result<MetadataRecord> {
            self.calls.borrow_mut().push(handle.clone());
            if handle.label() == "broken.jpg" {
                return Err(Error::Handle {
                    path: handle.path().to_path_buf(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            Ok(MetadataRecord {
                model: Some("EOS 5D".to_string()),
                ..Default::default()
            })
        }
    }

    #[test]
    fn empty_state_renders_home() {
        let screen = render(&AppState::default(), &CountingInspector::default());
        assert!(matches!(screen, Screen::Home { .. }));
        assert!(screen.to_string().contains("[single] [multiple]"));
    }

    #[test]
    fn only_expanded_items_are_inspected() {
        let mut state = AppState::default();
        state.update(Event::PickerResolved(PickOutcome::Multiple(vec![
            ImageHandle::new("a.jpg"),
            ImageHandle::new("b.jpg"),
        ])));
        state.update(Event::ToggleMetadata(1));

        let inspector = CountingInspector::default();
        let Screen::Gallery { items } = render(&state, &inspector) else {
            panic!("expected a gallery");
        };
        assert_eq!(items[0].body, ItemBody::Collapsed);
        assert!(matches!(items[1].body, ItemBody::Metadata(_)));
        assert_eq!(*inspector.calls.borrow(), vec![ImageHandle::new("b.jpg")]);
    }

    #[test]
    fn unreadable_items_show_an_error_line() {
        let mut state = AppState::default();
        state.update(Event::PickerResolved(PickOutcome::Single(ImageHandle::new(
            "broken.jpg",
        ))));

        let screen = render(&state, &CountingInspector::default());
        let text = screen.to_string();
        assert!(text.contains("#1 broken.jpg"));
        assert!(text.contains("metadata unavailable"));
        assert!(text.ends_with("[clear] [proceed]"));
    }

    #[test]
    fn expanded_item_lists_every_label() {
        let mut state = AppState::default();
        state.update(Event::PickerResolved(PickOutcome::Single(ImageHandle::new("a.jpg"))));

        let text = render(&state, &CountingInspector::default()).to_string();
        assert!(text.contains("  Image Model : EOS 5D"));
        assert!(text.contains("  Latitude Longitude : null"));
        assert!(text.contains("  File Source : null"));
    }
}
