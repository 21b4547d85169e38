/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::chunks::{Chunks, Inner};
use crate::error::{Error, ErrorKind};
use crate::size_hint::SizeHint;
use crate::stream::RawRequestStream;
use bytes::{Bytes, BytesMut};

/// Re-chunks another body so that every chunk except the last is exactly `chunk_size` bytes.
///
/// Chunk-signed uploads sign each chunk separately and need predictable chunk boundaries.
#[derive(Debug)]
pub(crate) struct FixedSize {
    inner: Box<RawRequestStream>,
    chunk_size: usize,
}

impl FixedSize {
    pub(crate) fn new(inner: RawRequestStream, chunk_size: usize) -> Result<Self, Error> {
        if chunk_size == 0 {
            return Err(ErrorKind::InvalidChunkSize.into());
        }
        Ok(Self {
            inner: Box::new(inner),
            chunk_size,
        })
    }

    pub(crate) fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }

    pub(crate) fn is_restartable(&self) -> bool {
        self.inner.is_restartable()
    }

    pub(crate) fn chunks(&self) -> Result<Chunks, Error> {
        Ok(Inner::FixedSize(Box::new(FixedSizeChunks {
            inner: self.inner.chunks()?,
            chunk_size: self.chunk_size,
            buf: BytesMut::new(),
            done: false,
        }))
        .into())
    }
}

#[derive(Debug)]
pub(crate) struct FixedSizeChunks {
    inner: Chunks,
    chunk_size: usize,
    buf: BytesMut,
    done: bool,
}

impl FixedSizeChunks {
    pub(crate) fn next(&mut self) -> Option<Result<Bytes, Error>> {
        loop {
            if self.buf.len() >= self.chunk_size {
                return Some(Ok(self.buf.split_to(self.chunk_size).freeze()));
            }
            if self.done {
                if self.buf.is_empty() {
                    return None;
                }
                return Some(Ok(self.buf.split().freeze()));
            }
            match self.inner.next() {
                // already the right size, skip the copy
                Some(Ok(chunk)) if self.buf.is_empty() && chunk.len() == self.chunk_size => {
                    return Some(Ok(chunk));
                }
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    self.done = true;
                    self.buf.clear();
                    return Some(Err(err));
                }
                None => self.done = true,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use crate::RequestStream;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn collect(stream: &RequestStream) -> Vec<Bytes> {
        stream
            .chunks()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn rechunks_uneven_input() {
        let stream = RequestStream::from_chunks(["a", "bcdef", "gh", "ijklmnop"])
            .rechunk(3)
            .unwrap();
        assert_eq!(
            vec!["abc", "def", "ghi", "jkl", "mno", "p"],
            collect(&stream)
        );
    }

    #[test]
    fn keeps_restartability_of_inner_body() {
        let stream = RequestStream::from("hello world").rechunk(4).unwrap();
        assert!(stream.is_restartable());
        assert_eq!(Some(11), stream.length());
        assert_eq!(collect(&stream), collect(&stream));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = RequestStream::from("abc").rechunk(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidChunkSize));
    }

    proptest! {
        #[test]
        fn chunks_are_fixed_size_and_content_is_preserved(
            input in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 0..16),
            chunk_size in 1usize..20,
        ) {
            let expected: Vec<u8> = input.concat();
            let stream = RequestStream::from_chunks(input.into_iter().map(Bytes::from))
                .rechunk(chunk_size)
                .unwrap();
            let chunks = collect(&stream);
            if let Some((last, rest)) = chunks.split_last() {
                prop_assert!(rest.iter().all(|chunk| chunk.len() == chunk_size));
                prop_assert!(!last.is_empty() && last.len() <= chunk_size);
            }
            prop_assert_eq!(expected, chunks.concat());
        }
    }
}
