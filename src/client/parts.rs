//! Multipart part sources and body encoding.
//!
//! # Responsibilities
//! - Classify each source as a file part (has a filename) or a field part
//! - Copy every source into the encoded body, aborting on the first copy failure
//! - Release every source exactly once
//!
//! # Design Decisions
//! - Sources are owned by the encoder and released on drop, so every exit
//!   path (success, copy failure, later errors) releases them once
//! - Sources are `std::io::Read`; encoding runs on the blocking pool
//! - The body is fully buffered so the debug dump shows every part
//! - Parts are written in sorted name order

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use crate::client::error::{ClientError, ClientResult};

/// Content type attached to file parts.
pub const FILE_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// A readable byte source for one multipart part.
///
/// Any release the source needs (closing a file, returning a buffer) belongs
/// in its `Drop` impl.
pub trait PartSource: Read + Send {
    /// Filename to attach when the source is backed by a named file.
    fn file_name(&self) -> Option<&str> {
        None
    }
}

impl<T: AsRef<[u8]> + Send> PartSource for Cursor<T> {}

/// In-memory field part without a filename.
#[derive(Debug, Clone)]
pub struct Field(Cursor<Vec<u8>>);

impl Field {
    pub fn text(value: impl Into<String>) -> Self {
        Self(Cursor::new(value.into().into_bytes()))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self(Cursor::new(value.into()))
    }
}

impl Read for Field {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl PartSource for Field {}

/// A file opened for upload; written as a file part named after the file.
#[derive(Debug)]
pub struct NamedFile {
    file: File,
    name: String,
}

impl NamedFile {
    /// Open `path`; the part's filename is the path's final component.
    ///
    /// Directories are stripped so local layout does not leak to the server.
    /// To send the path exactly as opened, use [`NamedFile::from_file`] with
    /// the full path as the name.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file, name })
    }

    /// Wrap an already open file under an explicit filename.
    pub fn from_file(file: File, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for NamedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl PartSource for NamedFile {
    fn file_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// An encoded `multipart/form-data` body and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// 30 random bytes, hex encoded.
fn random_boundary() -> String {
    (0..30).map(|_| format!("{:02x}", fastrand::u8(..))).collect()
}

/// Quote-escape a disposition parameter.
fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Encode the multipart body, consuming (and so releasing) every source.
pub(crate) fn encode_multipart(
    content: HashMap<String, Box<dyn PartSource>>,
) -> ClientResult<MultipartBody> {
    encode_with_boundary(content, random_boundary())
}

fn encode_with_boundary(
    content: HashMap<String, Box<dyn PartSource>>,
    boundary: String,
) -> ClientResult<MultipartBody> {
    let mut parts: Vec<(String, Box<dyn PartSource>)> = content.into_iter().collect();
    parts.sort_by(|a, b| a.0.cmp(&b.0));

    let mut bytes = Vec::new();
    for (index, (name, mut source)) in parts.into_iter().enumerate() {
        if index > 0 {
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());

        let disposition = match source.file_name() {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n",
                escape_quotes(&name),
                escape_quotes(file_name),
                FILE_PART_CONTENT_TYPE
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n",
                escape_quotes(&name)
            ),
        };
        bytes.extend_from_slice(disposition.as_bytes());
        bytes.extend_from_slice(b"\r\n");

        if let Err(source_err) = source.read_to_end(&mut bytes) {
            return Err(ClientError::Part {
                name,
                source: source_err,
            });
        }
    }

    if !bytes.is_empty() {
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(MultipartBody { boundary, bytes })
}
