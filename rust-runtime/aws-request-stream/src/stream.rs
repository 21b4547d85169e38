/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::path::Path;

use bytes::{Bytes, BytesMut};

use crate::body::RequestBody;
use crate::checksum::{Checksum, ChecksumAlgorithm, DEFAULT_HASH_ALGORITHM};
use crate::chunks::Chunks;
use crate::error::Error;
use crate::fixed_size::FixedSize;
use crate::path_body::{PathBody, PathBodyBuilder};
use crate::producer::Producer;
use crate::rewind::Rewind;
use crate::size_hint::SizeHint;
use crate::DEFAULT_CHUNK_SIZE;

// Upper bound on what `stringify` reserves up front; past it the buffer grows as chunks arrive.
const STRINGIFY_PREALLOCATE_LIMIT: usize = 16 * DEFAULT_CHUNK_SIZE;

/// The body of an outgoing request.
///
/// A `RequestStream` can be read three ways: as a sequence of chunks ([`chunks`](RequestStream::chunks)),
/// as one contiguous buffer ([`stringify`](RequestStream::stringify)), or through a digest
/// ([`hash`](RequestStream::hash)). Hashing and materializing are both built on chunk iteration, so
/// large files are never loaded into memory just to be hashed.
///
/// # Restartability
///
/// | source                                   | length              | passes |
/// |------------------------------------------|---------------------|--------|
/// | in-memory (`&str`, `String`, `Bytes`, ...) | known             | any    |
/// | file ([`read_from`](RequestStream::read_from)) | known         | any, each opens a new handle |
/// | iterator or closure ([`from_chunks`](RequestStream::from_chunks), [`from_fn`](RequestStream::from_fn)) | only if declared | one |
///
/// A single-pass body fails every access after the first with
/// [`ErrorKind::StreamAlreadyConsumed`](crate::error::ErrorKind::StreamAlreadyConsumed); it never
/// returns an empty or partial body instead. This includes computing its hash after it was sent.
/// Wrap it with [`rewindable`](RequestStream::rewindable) when it must be read more than once,
/// e.g. to sign it and then send it.
#[derive(Debug)]
pub struct RequestStream {
    pub(crate) inner: RawRequestStream,
}

impl RequestStream {
    /// Create a new `RequestStream` from a static byte slice
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(bytes))
    }

    /// Returns a [`PathBodyBuilder`], allowing you to build a `RequestStream` with
    /// full control over how the file is read (eg. specifying the length of
    /// the file or the starting offset to read from).
    pub fn read_from(path: impl AsRef<Path>) -> PathBodyBuilder {
        PathBodyBuilder::new(path)
    }

    /// Create a new `RequestStream` that reads data from a given `path`.
    ///
    /// The length of the file is read from its metadata when the stream is built and cached.
    /// The contents of the file MUST NOT change while the stream is in use.
    ///
    /// # Examples
    /// ```no_run
    /// use aws_request_stream::RequestStream;
    ///
    /// fn make_stream() -> RequestStream {
    ///     RequestStream::from_path("docs/rows.csv").expect("file should be readable")
    /// }
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<RequestStream, Error> {
        Self::read_from(path).build()
    }

    /// Create a single-pass `RequestStream` from a sequence of chunks. Its length is unknown.
    ///
    /// ```
    /// use aws_request_stream::RequestStream;
    ///
    /// let stream = RequestStream::from_chunks(["ab", "cd", "ef"]);
    /// assert_eq!(None, stream.length());
    /// assert_eq!("abcdef", stream.stringify().unwrap());
    /// // the chunks have been consumed
    /// assert!(stream.stringify().unwrap_err().is_already_consumed());
    /// ```
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes>,
    {
        Self::producer(chunks, None)
    }

    /// Create a single-pass `RequestStream` from a sequence of chunks of known total length.
    ///
    /// If the chunks add up to a different length, reading the stream fails with
    /// [`ErrorKind::LengthMismatch`](crate::error::ErrorKind::LengthMismatch).
    pub fn from_chunks_with_length<I, B>(chunks: I, length: u64) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes>,
    {
        Self::producer(chunks, Some(length))
    }

    /// Create a single-pass `RequestStream` from a sequence of chunks that may fail to be produced.
    pub fn from_fallible_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = io::Result<Bytes>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: RawRequestStream::Producer(Producer::new(Box::new(chunks.into_iter()), None)),
        }
    }

    /// Create a single-pass `RequestStream` that calls `f` for each chunk until it returns `None`.
    pub fn from_fn<F, B>(mut f: F) -> Self
    where
        F: FnMut() -> Option<B> + Send + 'static,
        B: Into<Bytes>,
    {
        Self::from_chunks(std::iter::from_fn(move || f()))
    }

    fn producer<I, B>(chunks: I, length: Option<u64>) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes>,
    {
        let source = chunks
            .into_iter()
            .map(|chunk| Ok::<Bytes, io::Error>(chunk.into()));
        Self {
            inner: RawRequestStream::Producer(Producer::new(Box::new(source), length)),
        }
    }

    /// Make this stream restartable.
    ///
    /// A single-pass stream is wrapped so that the first pass keeps a copy of every chunk, which
    /// later passes replay. If the first pass is abandoned or fails before the end, the stream can
    /// no longer be read: later passes fail with
    /// [`ErrorKind::StreamAlreadyConsumed`](crate::error::ErrorKind::StreamAlreadyConsumed), whose
    /// source describes the failure when there was one. Streams that are already restartable are
    /// returned unchanged.
    pub fn rewindable(self) -> Self {
        if self.is_restartable() {
            return self;
        }
        Self {
            inner: RawRequestStream::Rewind(Rewind::new(self.inner)),
        }
    }

    /// Re-chunk this stream so every chunk except the last is exactly `chunk_size` bytes.
    ///
    /// Length and restartability are those of the original stream.
    pub fn rechunk(self, chunk_size: usize) -> Result<Self, Error> {
        Ok(Self {
            inner: RawRequestStream::FixedSize(FixedSize::new(self.inner, chunk_size)?),
        })
    }

    /// Return the bounds on the length of the `RequestStream`
    pub fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }

    /// Length of the body in bytes, or `None` if it isn't known before the body is read.
    pub fn length(&self) -> Option<u64> {
        self.size_hint().get_exact()
    }

    /// True if the body can be read more than once.
    pub fn is_restartable(&self) -> bool {
        self.inner.is_restartable()
    }

    /// Start a pass over the body, returning its chunks in transmission order.
    pub fn chunks(&self) -> Result<Chunks, Error> {
        self.inner.chunks()
    }

    /// Read the whole body into a single contiguous buffer.
    ///
    /// In-memory bodies are returned without copying.
    pub fn stringify(&self) -> Result<Bytes, Error> {
        if let RawRequestStream::Buf(bytes) = &self.inner {
            return Ok(bytes.clone());
        }

        let mut chunks = self.chunks()?;
        let first = match chunks.next() {
            Some(chunk) => chunk?,
            None => return Ok(Bytes::new()),
        };
        let second = match chunks.next() {
            Some(chunk) => chunk?,
            None => return Ok(first),
        };

        // the declared length is only a hint until the pass has verified it
        let sz_hint = self.size_hint();
        let capacity = sz_hint
            .upper()
            .unwrap_or_else(|| sz_hint.lower())
            .min(STRINGIFY_PREALLOCATE_LIMIT as u64) as usize;
        let mut output = BytesMut::with_capacity(capacity);
        output.extend_from_slice(&first);
        output.extend_from_slice(&second);
        for chunk in chunks {
            output.extend_from_slice(&chunk?);
        }
        Ok(output.freeze())
    }

    /// Compute the raw digest of the body with the named algorithm.
    ///
    /// The algorithm is resolved before the body is read, so an unknown name never consumes a
    /// single-pass body.
    pub fn hash(&self, algorithm: &str) -> Result<Bytes, Error> {
        let checksum = algorithm.parse::<ChecksumAlgorithm>()?.into_impl();
        self.hash_with(checksum)
    }

    /// Compute the digest of the body with the named algorithm, lowercase hex encoded.
    pub fn hash_hex(&self, algorithm: &str) -> Result<String, Error> {
        Ok(hex::encode(self.hash(algorithm)?))
    }

    /// The lowercase hex SHA-256 of the body, as used by request signing.
    pub fn sha256_hex(&self) -> Result<String, Error> {
        self.hash_hex(DEFAULT_HASH_ALGORITHM)
    }

    /// Feed the body through `checksum` one chunk at a time and return its digest.
    pub fn hash_with(&self, mut checksum: Box<dyn Checksum>) -> Result<Bytes, Error> {
        for chunk in self.chunks()? {
            checksum.update(&chunk?);
        }
        Ok(checksum.finalize())
    }

    /// Start a pass over the body and expose it as an [`http_body::Body`].
    pub fn into_body(self) -> Result<RequestBody, Error> {
        let size_hint = self.size_hint();
        Ok(RequestBody::new(self.chunks()?, size_hint))
    }
}

#[derive(Debug)]
pub(crate) enum RawRequestStream {
    /// In-memory buffer to read from
    Buf(Bytes),
    /// File based input
    Fs(PathBody),
    /// Single-pass iterator or closure
    Producer(Producer),
    /// Single-pass input buffered on its first pass
    Rewind(Rewind),
    /// Another stream cut into equal chunks
    FixedSize(FixedSize),
}

impl RawRequestStream {
    pub(crate) fn size_hint(&self) -> SizeHint {
        match self {
            RawRequestStream::Buf(bytes) => SizeHint::exact(bytes.len() as u64),
            RawRequestStream::Fs(path_body) => SizeHint::exact(path_body.length),
            RawRequestStream::Producer(producer) => producer.size_hint(),
            RawRequestStream::Rewind(rewind) => rewind.size_hint(),
            RawRequestStream::FixedSize(fixed) => fixed.size_hint(),
        }
    }

    pub(crate) fn is_restartable(&self) -> bool {
        match self {
            RawRequestStream::Buf(_) | RawRequestStream::Fs(_) | RawRequestStream::Rewind(_) => {
                true
            }
            RawRequestStream::Producer(_) => false,
            RawRequestStream::FixedSize(fixed) => fixed.is_restartable(),
        }
    }

    pub(crate) fn chunks(&self) -> Result<Chunks, Error> {
        match self {
            RawRequestStream::Buf(bytes) => Ok(Chunks::once(bytes.clone())),
            RawRequestStream::Fs(path_body) => path_body.chunks(),
            RawRequestStream::Producer(producer) => producer.chunks(),
            RawRequestStream::Rewind(rewind) => rewind.chunks(),
            RawRequestStream::FixedSize(fixed) => fixed.chunks(),
        }
    }
}

impl Default for RequestStream {
    fn default() -> Self {
        Self {
            inner: RawRequestStream::Buf(Bytes::default()),
        }
    }
}

impl From<Bytes> for RequestStream {
    fn from(value: Bytes) -> Self {
        Self {
            inner: RawRequestStream::Buf(value),
        }
    }
}

impl From<Vec<u8>> for RequestStream {
    fn from(value: Vec<u8>) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<String> for RequestStream {
    fn from(value: String) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&'static [u8]> for RequestStream {
    fn from(slice: &'static [u8]) -> RequestStream {
        Self::from(Bytes::from_static(slice))
    }
}

impl From<&'static str> for RequestStream {
    fn from(slice: &'static str) -> RequestStream {
        Self::from(Bytes::from_static(slice.as_bytes()))
    }
}
