/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! Request bodies for AWS SDK requests.
//!
//! A [`RequestStream`] wraps the body of an outgoing request, whether it lives in memory, in a
//! file, or is produced lazily by an iterator. Request builders attach it to a [`request::Request`];
//! signing reads its [`length`](RequestStream::length) and [`sha256_hex`](RequestStream::sha256_hex);
//! the transport streams it through [`RequestBody`], an [`http_body::Body`].
//!
//! ```
//! use aws_request_stream::RequestStream;
//!
//! let stream = RequestStream::from("hello");
//! assert_eq!(Some(5), stream.length());
//! assert_eq!("hello", stream.stringify().unwrap());
//! assert_eq!(
//!     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
//!     stream.sha256_hex().unwrap()
//! );
//! ```

#![warn(
    missing_debug_implementations,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

pub(crate) const KIBIBYTE: usize = 1024;

/// Default upper bound on the size of chunks read from a file.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * KIBIBYTE;

mod body;
pub mod checksum;
mod chunks;
/// Error types emitted by `aws-request-stream`
pub mod error;
mod fixed_size;
mod path_body;
mod producer;
pub mod request;
mod rewind;
mod size_hint;
mod stream;

pub use self::body::RequestBody;
pub use self::checksum::DEFAULT_HASH_ALGORITHM;
pub use self::chunks::Chunks;
pub use self::path_body::PathBodyBuilder;
pub use self::size_hint::SizeHint;
pub use self::stream::RequestStream;
