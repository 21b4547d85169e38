/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::Error;
use crate::fixed_size::FixedSizeChunks;
use crate::path_body::FsChunks;
use crate::producer::ProducerChunks;
use crate::rewind::RewindChunks;
use bytes::Bytes;
use std::iter::FusedIterator;

/// One pass over the chunks of a [`RequestStream`](crate::RequestStream), in transmission order.
///
/// `Chunks` owns everything it reads from. For file backed bodies that includes the open file
/// handle, which is closed as soon as the iterator is exhausted, fails, or is dropped.
/// After yielding an error the iterator is finished.
#[derive(Debug)]
pub struct Chunks {
    inner: Inner,
}

#[derive(Debug)]
pub(crate) enum Inner {
    Once(Option<Bytes>),
    Fs(FsChunks),
    Producer(ProducerChunks),
    Rewind(Box<RewindChunks>),
    FixedSize(Box<FixedSizeChunks>),
}

impl Chunks {
    pub(crate) fn once(bytes: Bytes) -> Self {
        let bytes = if bytes.is_empty() { None } else { Some(bytes) };
        Inner::Once(bytes).into()
    }
}

impl From<Inner> for Chunks {
    fn from(inner: Inner) -> Self {
        Self { inner }
    }
}

impl Iterator for Chunks {
    type Item = Result<Bytes, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Once(bytes) => bytes.take().map(Ok),
            Inner::Fs(fs) => fs.next(),
            Inner::Producer(producer) => producer.next(),
            Inner::Rewind(rewind) => rewind.next(),
            Inner::FixedSize(fixed) => fixed.next(),
        }
    }
}

impl FusedIterator for Chunks {}
