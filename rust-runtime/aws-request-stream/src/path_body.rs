/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::chunks::{Chunks, Inner};
use crate::error::{Error, ErrorKind};
use crate::stream::{RawRequestStream, RequestStream};
use crate::DEFAULT_CHUNK_SIZE;
use bytes::Bytes;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Request body backed by a file on disk.
#[derive(Debug)]
pub(crate) struct PathBody {
    // The path to the file
    pub(crate) path: PathBuf,
    // The total number of bytes to read
    pub(crate) length: u64,
    // The byte-offset to start reading from
    pub(crate) offset: u64,
    // Upper bound on the size of each chunk
    pub(crate) chunk_size: usize,
}

impl PathBody {
    /// Open an independent handle for one pass over the file.
    pub(crate) fn chunks(&self) -> Result<Chunks, Error> {
        let mut file = File::open(&self.path).map_err(|err| Error::unreadable(&self.path, err))?;
        if self.offset > 0 {
            file.seek(SeekFrom::Start(self.offset))
                .map_err(|err| Error::unreadable(&self.path, err))?;
        }
        Ok(Inner::Fs(FsChunks {
            path: self.path.clone(),
            file: Some(file),
            length: self.length,
            remaining: self.length,
            chunk_size: self.chunk_size,
        })
        .into())
    }
}

/// Builder for creating a file backed [`RequestStream`].
///
/// ```no_run
/// use aws_request_stream::RequestStream;
///
/// fn request_stream_from_file() -> RequestStream {
///     RequestStream::read_from("docs/some-large-file.csv")
///         // Specify the length of the file used (skips an additional call to retrieve the size)
///         .length(123_456)
///         .build()
///         .expect("valid path")
/// }
/// ```
#[derive(Debug)]
pub struct PathBodyBuilder {
    path: PathBuf,
    length: Option<u64>,
    offset: Option<u64>,
    chunk_size: usize,
}

impl PathBodyBuilder {
    /// Create a new [`PathBodyBuilder`] reading from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            length: None,
            offset: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Specify the offset to start reading from (in bytes)
    ///
    /// When used in conjunction with [`length`](PathBodyBuilder::length), allows for reading a single "chunk" of a file.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Specify the length to read (in bytes).
    ///
    /// By pre-specifying the length, this API skips an additional call to retrieve the size from file-system metadata.
    ///
    /// When used in conjunction with [`offset`](PathBodyBuilder::offset), allows for reading a single "chunk" of a file.
    ///
    /// <div class="warning">
    /// Setting the length manually will trigger no validation when the body is built. If the file turns out
    /// to be shorter than `offset + length`, reading it fails with a length mismatch.
    /// </div>
    pub fn length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Specify the maximum size of each chunk read from the file. Defaults to [`DEFAULT_CHUNK_SIZE`].
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Returns a [`RequestStream`] from this builder.
    pub fn build(self) -> Result<RequestStream, Error> {
        if self.chunk_size == 0 {
            return Err(ErrorKind::InvalidChunkSize.into());
        }
        let offset = self.offset.unwrap_or_default();

        let length = match self.length {
            None => {
                let metadata =
                    fs::metadata(&self.path).map_err(|err| Error::unreadable(&self.path, err))?;
                let file_size = metadata.len();

                if offset > file_size {
                    return Err(ErrorKind::OffsetGreaterThanFileSize.into());
                }

                file_size - offset
            }
            Some(explicit) => explicit,
        };

        tracing::debug!(path = %self.path.display(), offset, length, "built file backed request body");

        let body = PathBody {
            path: self.path,
            length,
            offset,
            chunk_size: self.chunk_size,
        };

        Ok(RequestStream {
            inner: RawRequestStream::Fs(body),
        })
    }
}

/// Reads one pass over a [`PathBody`].
#[derive(Debug)]
pub(crate) struct FsChunks {
    path: PathBuf,
    // `None` once the pass is over, which closes the handle
    file: Option<File>,
    length: u64,
    remaining: u64,
    chunk_size: usize,
}

impl FsChunks {
    pub(crate) fn next(&mut self) -> Option<Result<Bytes, Error>> {
        if self.remaining == 0 {
            self.file = None;
            return None;
        }
        let file = self.file.as_mut()?;

        let want = self.remaining.min(self.chunk_size as u64);
        let mut buf = Vec::with_capacity(want as usize);
        let read = match file.by_ref().take(want).read_to_end(&mut buf) {
            Ok(read) => read as u64,
            Err(err) => {
                self.file = None;
                return Some(Err(Error::unreadable(&self.path, err)));
            }
        };

        if read == 0 {
            self.file = None;
            return Some(Err(ErrorKind::LengthMismatch {
                expected: self.length,
                actual: self.length - self.remaining,
            }
            .into()));
        }

        self.remaining -= read;
        tracing::trace!(path = %self.path.display(), read, remaining = self.remaining, "read chunk from file");
        Some(Ok(Bytes::from(buf)))
    }
}
