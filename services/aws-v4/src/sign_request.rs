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

use std::fmt::Write;
use std::time::Duration;

use apisig_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use apisig_core::time::{format_date, format_iso8601, normalize, now, DateTime};
use apisig_core::{sign_http_request, Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::header;
use http::HeaderValue;
use http::Request;
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::constants::*;
use crate::{Config, Credential};

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Signing is a pure computation over the request, the credential, the
/// service, the region and the signing time. It never performs I/O, so a
/// single signer can be shared between threads.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for AWS V4 signer.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Create a signer for `service` in the region carried by `config`.
    pub fn from_config(service: &str, config: &Config) -> Result<Self> {
        let region = config
            .region
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("region is not set in config"))?;

        Ok(Self::new(service, region))
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request with SigV4 headers.
    ///
    /// The returned request only differs from the input by `Authorization`,
    /// `X-Amz-Date` and `X-Amz-Security-Token`.
    pub fn sign<B: AsRef<[u8]>>(&self, req: Request<B>, cred: &Credential) -> Result<Request<B>> {
        sign_http_request(self, req, cred, SigningMethod::Header)
    }

    /// Presign the request, carrying the signature in the query string.
    ///
    /// `expires_in` must be between 1 second and 7 days.
    pub fn presign<B: AsRef<[u8]>>(
        &self,
        req: Request<B>,
        cred: &Credential,
        expires_in: Duration,
    ) -> Result<Request<B>> {
        sign_http_request(self, req, cred, SigningMethod::Query(expires_in))
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &mut SigningRequest<'_>,
        cred: &Self::Credential,
        method: SigningMethod,
    ) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        if self.region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        let now = normalize(self.time.unwrap_or_else(now))?;
        cred.check(now)?;
        if let SigningMethod::Query(expires_in) = method {
            if !(1..=MAX_PRESIGN_EXPIRES_SECS).contains(&expires_in.as_secs()) {
                return Err(Error::request_invalid(format!(
                    "presign expires_in must be between 1s and {MAX_PRESIGN_EXPIRES_SECS}s, got {expires_in:?}"
                )));
            }
        }

        let session_token = cred.session_token();
        if method == SigningMethod::Header {
            req.headers
                .insert(X_AMZ_DATE, HeaderValue::from_str(&format_iso8601(now))?);
            match session_token {
                Some(token) => {
                    let mut value = HeaderValue::from_str(token)?;
                    // Set token value sensitive to valid leaking.
                    value.set_sensitive(true);
                    req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
                }
                None => {
                    req.headers.remove(X_AMZ_SECURITY_TOKEN);
                }
            }
        }

        let headers = canonical_headers(req)?;
        let signed_headers = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");
        debug!("calculated signed headers: {signed_headers}");

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/{AWS4_REQUEST}",
            format_date(now),
            self.region,
            self.service
        );
        debug!("calculated scope: {scope}");

        if let SigningMethod::Query(expires_in) = method {
            req.query_push(X_AMZ_ALGORITHM_QUERY, ALGORITHM);
            req.query_push(
                X_AMZ_CREDENTIAL_QUERY,
                format!("{}/{scope}", cred.access_key_id),
            );
            req.query_push(X_AMZ_DATE_QUERY, format_iso8601(now));
            req.query_push(X_AMZ_EXPIRES_QUERY, expires_in.as_secs().to_string());
            req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers.as_str());
            if let Some(token) = session_token {
                req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token);
            }
        }

        let payload = payload_hash(req, &self.service, method)?;
        let creq = canonical_request_string(req, &self.service, &headers, &signed_headers, &payload)?;

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{ALGORITHM}")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", hex_sha256(creq.as_bytes()))?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        match method {
            SigningMethod::Query(_) => req.query_push(X_AMZ_SIGNATURE_QUERY, signature),
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                    cred.access_key_id,
                ))?;
                authorization.set_sensitive(true);

                req.headers.insert(header::AUTHORIZATION, authorization);
            }
        }

        Ok(())
    }
}

fn canonical_request_string(
    req: &SigningRequest<'_>,
    service: &str,
    headers: &[(String, String)],
    signed_headers: &str,
    payload: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", req.method.as_str().to_ascii_uppercase())?;
    writeln!(f, "{}", canonical_uri(req, service)?)?;
    writeln!(f, "{}", canonical_query(req))?;
    for (name, value) in headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{signed_headers}")?;
    write!(f, "{payload}")?;

    Ok(f)
}

/// S3 signs the path encoded once, every other service normalizes the
/// path and encodes the already encoded form again.
fn canonical_uri(req: &SigningRequest<'_>, service: &str) -> Result<String> {
    if service == "s3" {
        let path = percent_decode_str(&req.path).decode_utf8().map_err(|e| {
            Error::request_invalid("request path is not valid utf-8").with_source(e)
        })?;
        return Ok(utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string());
    }

    let path = normalize_path(&req.path);
    Ok(utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string())
}

/// Remove empty and dot segments, a trailing slash survives.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            v => segments.push(v),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if trailing && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn canonical_query(req: &SigningRequest<'_>) -> String {
    let mut query = req
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    // Sort by param name, then by value.
    query.sort();

    query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercased header names with their normalized values, sorted by name.
fn canonical_headers(req: &SigningRequest<'_>) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::with_capacity(req.headers.keys_len() + 1);
    for name in req.headers.keys() {
        if UNSIGNED_HEADERS.contains(&name.as_str()) {
            continue;
        }

        let mut values = Vec::new();
        for value in req.headers.get_all(name) {
            let value = value.to_str().map_err(|e| {
                Error::request_invalid(format!("header {name} is not visible ascii")).with_source(e)
            })?;
            values.push(value.split_whitespace().collect::<Vec<_>>().join(" "));
        }
        headers.push((name.as_str().to_string(), values.join(",")));
    }

    // Host is signed but never written back, the transport sets it.
    if !req.headers.contains_key(header::HOST) {
        headers.push((header::HOST.as_str().to_string(), req.host()));
    }

    headers.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    Ok(headers)
}

fn payload_hash(req: &SigningRequest<'_>, service: &str, method: SigningMethod) -> Result<String> {
    if let Some(v) = req.headers.get(X_AMZ_CONTENT_SHA_256) {
        return Ok(v.to_str()?.trim().to_string());
    }
    if service == "s3" && matches!(method, SigningMethod::Query(_)) {
        return Ok(UNSIGNED_PAYLOAD.to_string());
    }

    Ok(hex_sha256(req.body))
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}
