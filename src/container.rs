//! Append targets for loaded markup
//!
//! A container only ever grows: fragments are appended at the end and
//! existing content is never touched.

use crate::error::{Error, Result};
use std::io::Write;

/// Sink that receives page markup in document order
pub trait Container: Send {
    /// Append a fragment after all existing content
    fn append(&mut self, fragment: &str) -> Result<()>;
}

/// In-memory container holding each appended fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlBuffer {
    fragments: Vec<String>,
}

impl HtmlBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that already holds server-rendered content
    pub fn with_content(initial: impl Into<String>) -> Self {
        Self {
            fragments: vec![initial.into()],
        }
    }

    /// Fragments in document order
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Concatenated markup
    pub fn html(&self) -> String {
        self.fragments.concat()
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Container for HtmlBuffer {
    fn append(&mut self, fragment: &str) -> Result<()> {
        self.fragments.push(fragment.to_string());
        Ok(())
    }
}

/// Container writing fragments to any `Write` sink (file, stdout)
#[derive(Debug)]
pub struct WriterContainer<W: Write + Send> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write + Send> WriterContainer<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Bytes appended so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Container for WriterContainer<W> {
    fn append(&mut self, fragment: &str) -> Result<()> {
        self.writer
            .write_all(fragment.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| Error::append(e.to_string()))?;
        self.bytes_written += fragment.len() as u64;
        Ok(())
    }
}
