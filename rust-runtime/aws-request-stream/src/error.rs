/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error as StdError;
use std::fmt;
use std::fmt::Formatter;
use std::io::{Error as StdIoError, ErrorKind as StdIoErrorKind};
use std::path::PathBuf;

/// The kind of failure behind an [`Error`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A file backed body could not be inspected, opened, seeked or read.
    UnreadableSource {
        /// Path of the file that failed
        path: PathBuf,
    },
    /// The configured offset lies past the end of the file.
    OffsetGreaterThanFileSize,
    /// No hash implementation is registered under this name.
    UnsupportedAlgorithm(String),
    /// A single-pass body was asked for a second pass. When a rewindable body's first pass
    /// failed, the error's source carries that failure.
    StreamAlreadyConsumed,
    /// The number of bytes produced disagrees with the declared length.
    LengthMismatch {
        /// Declared length in bytes
        expected: u64,
        /// Bytes actually produced
        actual: u64,
    },
    /// Re-chunking was requested with a chunk size of zero.
    InvalidChunkSize,
    /// A fallible chunk producer returned an error.
    IoError,
    /// An HTTP request could not be built from the request parts.
    InvalidRequest,
}

/// A request body related error occurred
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: StdIoError) -> Self {
        Self {
            kind: ErrorKind::UnreadableSource { path: path.into() },
            source: Some(source.into()),
        }
    }

    pub(crate) fn io(source: StdIoError) -> Self {
        Self {
            kind: ErrorKind::IoError,
            source: Some(source.into()),
        }
    }

    /// A restartable body can't be replayed because its first pass failed with `cause`.
    pub(crate) fn consumed_after_failure(cause: impl Into<String>) -> Self {
        let cause: String = cause.into();
        Self {
            kind: ErrorKind::StreamAlreadyConsumed,
            source: Some(cause.into()),
        }
    }

    pub(crate) fn invalid_request(
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            kind: ErrorKind::InvalidRequest,
            source: Some(source.into()),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True if this error was caused by reading a single-pass body twice.
    pub fn is_already_consumed(&self) -> bool {
        matches!(self.kind, ErrorKind::StreamAlreadyConsumed)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnreadableSource { path } => {
                write!(f, "failed to read request body from `{}`", path.display())
            }
            ErrorKind::OffsetGreaterThanFileSize => write!(
                f,
                "offset must not exceed file size but was greater than it"
            ),
            ErrorKind::UnsupportedAlgorithm(name) => {
                write!(f, "unsupported hash algorithm `{name}`")
            }
            ErrorKind::StreamAlreadyConsumed => write!(
                f,
                "request body is single-pass and has already been consumed"
            ),
            ErrorKind::LengthMismatch { expected, actual } => write!(
                f,
                "request body declared {expected} bytes but produced {actual}"
            ),
            ErrorKind::InvalidChunkSize => write!(f, "chunk size must be greater than zero"),
            ErrorKind::IoError => write!(f, "I/O error while producing request body"),
            ErrorKind::InvalidRequest => write!(f, "failed to build HTTP request"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

impl From<Error> for StdIoError {
    fn from(err: Error) -> Self {
        let kind = match err.kind {
            ErrorKind::LengthMismatch { .. } => StdIoErrorKind::UnexpectedEof,
            ErrorKind::InvalidChunkSize | ErrorKind::UnsupportedAlgorithm(_) => {
                StdIoErrorKind::InvalidInput
            }
            _ => StdIoErrorKind::Other,
        };
        StdIoError::new(kind, err)
    }
}

#[cfg(test)]
mod test {
    use super::{Error, ErrorKind};
    use std::error::Error as _;
    use std::io;

    #[test]
    fn unreadable_source_keeps_io_error_as_source() {
        let err = Error::unreadable(
            "/does/not/exist",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err.kind(), ErrorKind::UnreadableSource { .. }));
        assert_eq!(
            "failed to read request body from `/does/not/exist`",
            err.to_string()
        );
        assert_eq!("missing", err.source().unwrap().to_string());
    }

    #[test]
    fn offset_error_message() {
        let err: Error = ErrorKind::OffsetGreaterThanFileSize.into();
        assert_eq!(
            "offset must not exceed file size but was greater than it",
            err.to_string()
        );
    }

    #[test]
    fn length_mismatch_converts_to_unexpected_eof() {
        let err: Error = ErrorKind::LengthMismatch {
            expected: 10,
            actual: 4,
        }
        .into();
        let io_err: io::Error = err.into();
        assert_eq!(io::ErrorKind::UnexpectedEof, io_err.kind());
    }
}
