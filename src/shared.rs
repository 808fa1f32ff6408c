use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::TextBuffer;

/// A [`TextBuffer`] shared between threads.
///
/// The lock covers the whole buffer for the length of one closure, so a
/// reader never observes a half-shifted set of lines.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<TextBuffer>>,
}

impl SharedBuffer {
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&TextBuffer) -> T) -> T {
        f(&self.lock())
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut TextBuffer) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn to_text(&self) -> String {
        self.lock().to_text()
    }

    /// Writes the text to `path` while holding the lock, so writers sharing
    /// this buffer never interleave on the same file.
    pub fn write_file(&self, path: &Path) -> io::Result<()> {
        let buffer = self.lock();
        fs::write(path, buffer.to_text())
    }

    // Buffer mutations never leave partial state behind, so a poisoned lock
    // still guards a consistent buffer.
    fn lock(&self) -> MutexGuard<'_, TextBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TextBuffer> for SharedBuffer {
    fn from(buffer: TextBuffer) -> Self {
        Self::new(buffer)
    }
}
