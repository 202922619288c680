// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::str::FromStr;
use std::time::Duration;

use http::request::Parts;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// RFC 3986 unreserved characters stay as is, everything else is encoded.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context for request.
///
/// A read-only snapshot of the request being signed. Signers may only change
/// `headers` and push new query pairs via [`SigningRequest::query_push`];
/// method, uri and body are never written back.
#[derive(Debug)]
pub struct SigningRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent encoded as it appears in the uri.
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// HTTP body.
    pub body: &'a [u8],

    uri: Uri,
    appended_query: Vec<(String, String)>,
}

impl<'a> SigningRequest<'a> {
    /// Build a signing context from http::request::Parts.
    ///
    /// Fails if the uri doesn't carry a host.
    pub fn build(parts: &Parts, body: &'a [u8]) -> Result<Self> {
        let uri = parts.uri.clone();
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| Error::request_invalid("request without authority is invalid for signing"))?;
        if authority.host().is_empty() {
            return Err(Error::request_invalid(
                "request without host is invalid for signing",
            ));
        }

        let path = match uri.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };
        let query = uri
            .query()
            .map(|v| {
                form_urlencoded::parse(v.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
            path,
            query,
            headers: parts.headers.clone(),
            body,

            uri,
            appended_query: Vec::new(),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Headers are replaced by the signed headers. The uri is only rebuilt
    /// when query pairs have been pushed, in which case they are appended
    /// to the original query untouched.
    pub fn apply(self, parts: &mut Parts) -> Result<()> {
        parts.headers = self.headers;

        if self.appended_query.is_empty() {
            return Ok(());
        }

        let mut uri_parts = self.uri.into_parts();
        let mut paq = uri_parts
            .path_and_query
            .as_ref()
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        if !paq.starts_with('/') {
            paq.insert(0, '/');
        }

        let mut sep = if paq.contains('?') {
            if paq.ends_with('?') || paq.ends_with('&') {
                ""
            } else {
                "&"
            }
        } else {
            "?"
        };
        for (k, v) in &self.appended_query {
            paq.push_str(sep);
            paq.push_str(&utf8_percent_encode(k, QUERY_ENCODE_SET).to_string());
            paq.push('=');
            paq.push_str(&utf8_percent_encode(v, QUERY_ENCODE_SET).to_string());
            sep = "&";
        }

        uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);
        parts.uri = Uri::from_parts(uri_parts)?;
        Ok(())
    }

    /// Push a new query pair that will be appended to the request uri.
    ///
    /// The pair is also visible in `query` so that it takes part in signing.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.query.push((key.clone(), value.clone()));
        self.appended_query.push((key, value));
    }

    /// Get the host as it should be sent in the `Host` header.
    ///
    /// Userinfo is never part of it and the port is omitted when it's the
    /// default one of the scheme.
    pub fn host(&self) -> String {
        let host = self.authority.host();
        match self.authority.port_u16() {
            Some(80) if self.scheme == Scheme::HTTP => host.to_string(),
            Some(443) if self.scheme == Scheme::HTTPS => host.to_string(),
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query, valid for the given duration.
    Query(Duration),
}
