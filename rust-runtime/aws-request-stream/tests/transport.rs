/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_request_stream::request::Request;
use aws_request_stream::RequestStream;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::Method;
use http_body::Body;
use http_body_util::BodyExt;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn upload_file_with_signed_payload() {
    let mut tmp = NamedTempFile::new().unwrap();
    let content = "a lep is a ball, a tay is a hammer, a flix is a comb";
    tmp.write_all(content.as_bytes()).unwrap();

    let body = RequestStream::read_from(tmp.path())
        .chunk_size(8)
        .build()
        .unwrap();
    let mut request = Request::new(Method::PUT, "https://bucket.s3.amazonaws.com/lep.txt", body);
    let payload_hash = request.payload_sha256().unwrap();
    request.headers_mut().insert(
        HeaderName::from_static("x-amz-content-sha256"),
        HeaderValue::from_str(&payload_hash).unwrap(),
    );

    let request = request.into_http().unwrap();
    assert_eq!(
        content.len().to_string(),
        request.headers()[CONTENT_LENGTH].to_str().unwrap()
    );
    assert_eq!(
        payload_hash,
        request.headers()["x-amz-content-sha256"].to_str().unwrap()
    );
    assert_eq!(Some(content.len() as u64), request.body().size_hint().exact());

    let sent = request.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(content, sent);
}

#[tokio::test]
async fn stream_generated_body_with_chunked_encoding() {
    let mut part = 0;
    let body = RequestStream::from_fn(move || {
        part += 1;
        (part <= 3).then(|| format!("part {part};"))
    });
    let request = Request::new(Method::POST, "https://example.com/upload", body)
        .into_http()
        .unwrap();
    assert_eq!("chunked", request.headers()[TRANSFER_ENCODING]);

    let mut body = request.into_body();
    let mut frames = Vec::new();
    while let Some(frame) = body.frame().await {
        frames.push(frame.unwrap().into_data().unwrap());
    }
    assert_eq!(vec!["part 1;", "part 2;", "part 3;"], frames);
}

#[tokio::test]
async fn fixed_size_chunks_for_chunk_signing() {
    let body = RequestStream::from(vec![b'z'; 20]).rechunk(8).unwrap();
    let mut body = body.into_body().unwrap();
    let mut sizes = Vec::new();
    while let Some(frame) = body.frame().await {
        sizes.push(frame.unwrap().into_data().unwrap().len());
    }
    assert_eq!(vec![8, 8, 4], sizes);
}
