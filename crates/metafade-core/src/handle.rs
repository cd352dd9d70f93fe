// File: crates/metafade-core/src/handle.rs

//! Scoped access to image resources.
//!
//! An [`ImageHandle`] is only a reference. Reading or writing goes through a
//! guard that owns the open descriptor and releases it when dropped, so every
//! exit path (success, error, early return) closes the file.

use crate::{Error, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Opaque reference to one image resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(PathBuf);

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Final path component, for display.
    pub fn label(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }

    /// Opens the resource for reading.
    pub fn open_read(&self) -> Result<ReadGuard> {
        let file = File::open(&self.0).map_err(|source| self.handle_error(source))?;
        trace!("acquired read handle for {}", self.0.display());
        Ok(ReadGuard {
            inner: Guard::new(self.clone(), file),
        })
    }

    /// Opens the resource for reading and writing. Fails up front when the
    /// file is missing or read-only.
    pub fn open_write(&self) -> Result<WriteGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.0)
            .map_err(|source| self.handle_error(source))?;
        trace!("acquired write handle for {}", self.0.display());
        Ok(WriteGuard {
            inner: Guard::new(self.clone(), file),
        })
    }

    fn handle_error(&self, source: io::Error) -> Error {
        Error::Handle {
            path: self.0.clone(),
            source,
        }
    }
}

impl From<PathBuf> for ImageHandle {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Where a scrubbed file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTarget {
    /// Replace the original file.
    #[default]
    InPlace,
    /// Write `name.clean.ext` next to the original.
    CleanCopy,
}

impl SaveTarget {
    pub fn destination(self, path: &Path) -> PathBuf {
        match self {
            SaveTarget::InPlace => path.to_path_buf(),
            SaveTarget::CleanCopy => {
                let original_name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("file");

                let extension = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .unwrap_or("bin");
                let new_file_name = format!("{}.clean.{}", original_name, extension);
                path.with_file_name(new_file_name)
            }
        }
    }
}

/// Owns an open descriptor until released or dropped.
#[derive(Debug)]
struct Guard {
    handle: ImageHandle,
    file: Option<File>,
}

impl Guard {
    fn new(handle: ImageHandle, file: File) -> Self {
        Self {
            handle,
            file: Some(file),
        }
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        let file = self.file.as_mut().ok_or_else(|| Error::Handle {
            path: self.handle.0.clone(),
            source: io::Error::other("handle already released"),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn release(&mut self) {
        if self.file.take().is_some() {
            trace!("released handle for {}", self.handle.0.display());
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Durably replaces `destination` with `bytes` and releases the handle.
    ///
    /// The bytes go to a temporary file in the destination directory, which
    /// is synced and then renamed over the destination. On any failure the
    /// destination is left as it was.
    fn persist(&mut self, bytes: &[u8], destination: PathBuf) -> Result<PathBuf> {
        let persist_error = |source: io::Error| Error::Persist {
            path: destination.clone(),
            source,
        };

        let permissions = self
            .file
            .as_ref()
            .map(|file| file.metadata().map(|meta| meta.permissions()))
            .transpose()
            .map_err(persist_error)?;

        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut staged = NamedTempFile::new_in(&directory).map_err(persist_error)?;
        staged.write_all(bytes).map_err(persist_error)?;
        staged.as_file().sync_all().map_err(persist_error)?;
        if let Some(permissions) = permissions {
            staged
                .as_file()
                .set_permissions(permissions)
                .map_err(persist_error)?;
        }

        // Close our descriptor before the rename replaces the file under it.
        self.release();

        staged
            .persist(&destination)
            .map_err(|e| persist_error(e.error))?;
        Ok(destination)
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A read-only acquisition of an image.
#[derive(Debug)]
pub struct ReadGuard {
    inner: Guard,
}

impl ReadGuard {
    pub fn handle(&self) -> &ImageHandle {
        &self.inner.handle
    }

    /// Reads the whole resource from the current position.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.inner.read_all()
    }

    pub fn release(&mut self) {
        self.inner.release();
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Writes `bytes` to the `.clean` sibling of the resource, which itself
    /// is never opened for writing.
    pub fn save_copy(mut self, bytes: &[u8]) -> Result<PathBuf> {
        let destination = SaveTarget::CleanCopy.destination(&self.inner.handle.0);
        self.inner.persist(bytes, destination)
    }
}

/// A read-write acquisition of an image.
#[derive(Debug)]
pub struct WriteGuard {
    inner: Guard,
}

impl WriteGuard {
    pub fn handle(&self) -> &ImageHandle {
        &self.inner.handle
    }

    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.inner.read_all()
    }

    pub fn release(&mut self) {
        self.inner.release();
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Saves `bytes` to the destination of `target` and releases the handle.
    pub fn commit(mut self, bytes: &[u8], target: SaveTarget) -> Result<PathBuf> {
        let destination = target.destination(&self.inner.handle.0);
        self.inner.persist(bytes, destination)
    }
}
