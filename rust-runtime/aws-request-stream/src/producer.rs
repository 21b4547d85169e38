/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::chunks::{Chunks, Inner};
use crate::error::{Error, ErrorKind};
use crate::size_hint::SizeHint;
use bytes::Bytes;
use std::fmt;
use std::io;
use std::sync::Mutex;

pub(crate) type BoxChunkIter = Box<dyn Iterator<Item = io::Result<Bytes>> + Send>;

/// Single-pass request body fed by an iterator or a closure.
///
/// The source is handed out on the first pass. Any later pass fails with
/// [`ErrorKind::StreamAlreadyConsumed`].
pub(crate) struct Producer {
    source: Mutex<Option<BoxChunkIter>>,
    length: Option<u64>,
}

impl Producer {
    pub(crate) fn new(source: BoxChunkIter, length: Option<u64>) -> Self {
        Self {
            source: Mutex::new(Some(source)),
            length,
        }
    }

    pub(crate) fn size_hint(&self) -> SizeHint {
        match self.length {
            Some(length) => SizeHint::exact(length),
            None => SizeHint::default(),
        }
    }

    pub(crate) fn is_consumed(&self) -> bool {
        self.source.lock().expect("lock valid").is_none()
    }

    pub(crate) fn chunks(&self) -> Result<Chunks, Error> {
        let source = self
            .source
            .lock()
            .expect("lock valid")
            .take()
            .ok_or(ErrorKind::StreamAlreadyConsumed)?;
        tracing::debug!(length = ?self.length, "handing out single-pass request body");
        Ok(Inner::Producer(ProducerChunks {
            source,
            declared: self.length,
            produced: 0,
            done: false,
        })
        .into())
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("length", &self.length)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// The one pass over a [`Producer`].
pub(crate) struct ProducerChunks {
    source: BoxChunkIter,
    declared: Option<u64>,
    produced: u64,
    done: bool,
}

impl ProducerChunks {
    fn finish(&mut self, result: Result<Bytes, Error>) -> Option<Result<Bytes, Error>> {
        self.done = true;
        Some(result)
    }

    fn mismatch(&self, expected: u64) -> Error {
        ErrorKind::LengthMismatch {
            expected,
            actual: self.produced,
        }
        .into()
    }

    pub(crate) fn next(&mut self) -> Option<Result<Bytes, Error>> {
        if self.done {
            return None;
        }
        loop {
            match self.source.next() {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    self.produced += chunk.len() as u64;
                    if let Some(expected) = self.declared.filter(|d| self.produced > *d) {
                        let err = self.mismatch(expected);
                        return self.finish(Err(err));
                    }
                    tracing::trace!(len = chunk.len(), produced = self.produced, "produced chunk");
                    return Some(Ok(chunk));
                }
                Some(Err(err)) => return self.finish(Err(Error::io(err))),
                None => {
                    self.done = true;
                    return match self.declared {
                        Some(expected) if expected != self.produced => {
                            Some(Err(self.mismatch(expected)))
                        }
                        _ => None,
                    };
                }
            }
        }
    }
}

impl fmt::Debug for ProducerChunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerChunks")
            .field("declared", &self.declared)
            .field("produced", &self.produced)
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::Producer;
    use crate::error::ErrorKind;
    use bytes::Bytes;
    use std::io;

    fn producer(chunks: &[&'static str], length: Option<u64>) -> Producer {
        let source = chunks
            .to_vec()
            .into_iter()
            .map(|chunk| Ok::<_, io::Error>(Bytes::from_static(chunk.as_bytes())));
        Producer::new(Box::new(source), length)
    }

    #[test]
    fn skips_empty_chunks() {
        let producer = producer(&["ab", "", "cd"], None);
        let chunks = producer
            .chunks()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(vec!["ab", "cd"], chunks);
    }

    #[test]
    fn second_pass_fails() {
        let producer = producer(&["ab"], None);
        assert!(!producer.is_consumed());
        let _ = producer.chunks().unwrap();
        assert!(producer.is_consumed());
        let err = producer.chunks().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::StreamAlreadyConsumed));
    }

    #[test]
    fn short_producer_fails_at_the_end() {
        let producer = producer(&["ab", "cd"], Some(6));
        let mut chunks = producer.chunks().unwrap();
        assert_eq!("ab", chunks.next().unwrap().unwrap());
        assert_eq!("cd", chunks.next().unwrap().unwrap());
        let err = chunks.next().unwrap().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::LengthMismatch {
                expected: 6,
                actual: 4
            }
        ));
        assert!(chunks.next().is_none());
    }

    #[test]
    fn long_producer_fails_on_the_overflowing_chunk() {
        let producer = producer(&["ab", "cd"], Some(3));
        let mut chunks = producer.chunks().unwrap();
        assert_eq!("ab", chunks.next().unwrap().unwrap());
        assert!(chunks.next().unwrap().is_err());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn producer_errors_end_the_pass() {
        let source = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
            Ok(Bytes::from_static(b"cd")),
        ];
        let producer = Producer::new(Box::new(source.into_iter()), None);
        let mut chunks = producer.chunks().unwrap();
        assert!(chunks.next().unwrap().is_ok());
        let err = chunks.next().unwrap().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IoError));
        assert!(chunks.next().is_none());
    }
}
