/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The transport-agnostic request that operation inputs serialize into.

use crate::body::RequestBody;
use crate::error::Error;
use crate::RequestStream;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, Method, Uri};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use std::fmt::Write;

/// RFC 3986 unreserved characters are the only ones left as-is in query strings.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A serialized operation input, ready to be signed and sent.
///
/// ```
/// use aws_request_stream::request::Request;
/// use http::header::{HeaderName, HeaderValue};
/// use http::Method;
///
/// let request = Request::new(Method::POST, "https://athena.us-east-1.amazonaws.com/", "{}")
///     .with_header(
///         HeaderName::from_static("x-amz-target"),
///         HeaderValue::from_static("AmazonAthena.ListTableMetadata"),
///     );
/// assert_eq!(Some(2), request.content_length());
/// let request = request.into_http().unwrap();
/// assert_eq!("2", request.headers()["content-length"]);
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: String,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: RequestStream,
}

impl Request {
    /// Create a request without query parameters or headers.
    pub fn new(method: Method, uri: impl Into<String>, body: impl Into<RequestStream>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a query parameter, replacing any previous value for `name`.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a header, replacing any previous value for `name`.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target URI, without the query parameters added through this request.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Query parameters, in the order they are encoded.
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Mutable access to the query parameters.
    pub fn query_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.query
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body.
    pub fn body(&self) -> &RequestStream {
        &self.body
    }

    /// The body length, when it is known without reading the body.
    pub fn content_length(&self) -> Option<u64> {
        self.body.length()
    }

    /// Lowercase hex SHA-256 of the body, the value signing puts in `x-amz-content-sha256`.
    ///
    /// This reads the body. A single-pass body must be made
    /// [`rewindable`](RequestStream::rewindable) first or it can't be sent afterwards.
    pub fn payload_sha256(&self) -> Result<String, Error> {
        self.body.sha256_hex()
    }

    /// Build the `http::Request` handed to the transport.
    ///
    /// The body length goes in `Content-Length` when known; otherwise the body is sent with
    /// `Transfer-Encoding: chunked`. Either header is left alone if already set.
    pub fn into_http(self) -> Result<http::Request<RequestBody>, Error> {
        // parsed before the body is touched so a bad URI doesn't consume a single-pass body
        let uri = self
            .encoded_uri()
            .parse::<Uri>()
            .map_err(Error::invalid_request)?;
        let length = self.body.length();
        let body = self.body.into_body()?;

        let mut request = http::Request::new(body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;

        let mut headers = self.headers;
        if !headers.contains_key(CONTENT_LENGTH) && !headers.contains_key(TRANSFER_ENCODING) {
            match length {
                Some(length) => {
                    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
                }
                None => {
                    headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
                }
            }
        }
        *request.headers_mut() = headers;
        Ok(request)
    }

    fn encoded_uri(&self) -> String {
        let mut uri = self.uri.clone();
        let mut separator = if uri.contains('?') { '&' } else { '?' };
        for (name, value) in &self.query {
            // writing to a String can't fail
            let _ = write!(
                uri,
                "{separator}{}={}",
                utf8_percent_encode(name, QUERY_SET),
                utf8_percent_encode(value, QUERY_SET)
            );
            separator = '&';
        }
        uri
    }
}
