/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::chunks::Chunks;
use crate::error::Error;
use crate::size_hint::SizeHint;
use bytes::Bytes;
use http_body::Frame;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A [`RequestStream`](crate::RequestStream) pass exposed as an [`http_body::Body`].
///
/// This is the Body handed to the HTTP transport. Chunks are produced on the polling task;
/// file reads happen inline, so polling never returns `Pending`.
#[derive(Debug)]
pub struct RequestBody {
    // `None` once the body is exhausted or failed
    chunks: Option<Chunks>,
    remaining: SizeHint,
}

impl RequestBody {
    pub(crate) fn new(chunks: Chunks, size_hint: SizeHint) -> Self {
        Self {
            chunks: Some(chunks),
            remaining: size_hint,
        }
    }

    fn poll_inner(&mut self) -> Poll<Option<Result<Bytes, Error>>> {
        match self.chunks.as_mut().and_then(Iterator::next) {
            Some(Ok(bytes)) => {
                let len = bytes.len() as u64;
                self.remaining = SizeHint::default()
                    .with_lower(self.remaining.lower().saturating_sub(len))
                    .with_upper(self.remaining.upper().map(|upper| upper.saturating_sub(len)));
                Poll::Ready(Some(Ok(bytes)))
            }
            Some(Err(err)) => {
                self.chunks = None;
                Poll::Ready(Some(Err(err)))
            }
            None => {
                self.chunks = None;
                self.remaining = SizeHint::exact(0);
                Poll::Ready(None)
            }
        }
    }
}

impl http_body::Body for RequestBody {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.get_mut()
            .poll_inner()
            .map(|opt| opt.map(|res| res.map(Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        self.chunks.is_none()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        (&self.remaining).into()
    }
}
