/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::chunks::{Chunks, Inner};
use crate::error::{Error, ErrorKind};
use crate::size_hint::SizeHint;
use crate::stream::RawRequestStream;
use bytes::{Bytes, BytesMut};
use std::sync::{Arc, Mutex};

/// Makes a single-pass body restartable by keeping a copy of what the first pass read.
#[derive(Debug)]
pub(crate) struct Rewind {
    state: Arc<Mutex<State>>,
    size_hint: SizeHint,
}

#[derive(Debug)]
enum State {
    /// Nobody has read the wrapped body yet
    Pending(Box<RawRequestStream>),
    /// The first pass is running, or was abandoned before it finished
    Buffering,
    /// The first pass failed with this error message
    Failed(String),
    Buffered(Bytes),
}

impl Rewind {
    pub(crate) fn new(inner: RawRequestStream) -> Self {
        Self {
            size_hint: inner.size_hint(),
            state: Arc::new(Mutex::new(State::Pending(Box::new(inner)))),
        }
    }

    pub(crate) fn size_hint(&self) -> SizeHint {
        match &*self.state.lock().expect("lock valid") {
            State::Buffered(bytes) => SizeHint::exact(bytes.len() as u64),
            _ => self.size_hint.clone(),
        }
    }

    pub(crate) fn chunks(&self) -> Result<Chunks, Error> {
        let mut state = self.state.lock().expect("lock valid");
        match std::mem::replace(&mut *state, State::Buffering) {
            State::Buffered(bytes) => {
                *state = State::Buffered(bytes.clone());
                Ok(Chunks::once(bytes))
            }
            State::Buffering => Err(ErrorKind::StreamAlreadyConsumed.into()),
            State::Failed(cause) => {
                *state = State::Failed(cause.clone());
                Err(Error::consumed_after_failure(cause))
            }
            State::Pending(inner) => {
                let inner = match inner.chunks() {
                    Ok(inner) => inner,
                    Err(err) => {
                        *state = State::Failed(err.to_string());
                        return Err(err);
                    }
                };
                Ok(Inner::Rewind(Box::new(RewindChunks {
                    inner,
                    buf: BytesMut::new(),
                    state: Arc::clone(&self.state),
                    done: false,
                }))
                .into())
            }
        }
    }
}

/// The first pass over a [`Rewind`], copying every chunk it hands out.
#[derive(Debug)]
pub(crate) struct RewindChunks {
    inner: Chunks,
    buf: BytesMut,
    state: Arc<Mutex<State>>,
    done: bool,
}

impl RewindChunks {
    pub(crate) fn next(&mut self) -> Option<Result<Bytes, Error>> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(chunk)) => {
                self.buf.extend_from_slice(&chunk);
                Some(Ok(chunk))
            }
            Some(Err(err)) => {
                self.done = true;
                self.buf = BytesMut::new();
                tracing::debug!(error = %err, "first pass over rewindable request body failed");
                *self.state.lock().expect("lock valid") = State::Failed(err.to_string());
                Some(Err(err))
            }
            None => {
                self.done = true;
                let bytes = self.buf.split().freeze();
                tracing::debug!(len = bytes.len(), "buffered single-pass request body");
                *self.state.lock().expect("lock valid") = State::Buffered(bytes);
                None
            }
        }
    }
}
