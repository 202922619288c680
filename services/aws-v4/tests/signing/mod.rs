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

mod presigned;
mod special_chars;
mod standard;

use anyhow::Result;
use apisig_aws_v4::{Credential, RequestSigner};
use http::{Request, StatusCode};
use log::debug;
use reqwest::Client;
use std::env;

/// Load credential from the test environment.
pub fn load_static_credential() -> Result<Credential> {
    let access_key =
        env::var("APISIG_AWS_V4_ACCESS_KEY").expect("APISIG_AWS_V4_ACCESS_KEY must be set");
    let secret_key =
        env::var("APISIG_AWS_V4_SECRET_KEY").expect("APISIG_AWS_V4_SECRET_KEY must be set");
    let session_token = env::var("APISIG_AWS_V4_SESSION_TOKEN").unwrap_or_default();

    Ok(Credential::new(&access_key, &secret_key).with_session_token(&session_token))
}

/// Initialize test environment, returns the signer and the items api url.
pub fn init_signing_test() -> Option<(RequestSigner, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("APISIG_AWS_V4_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let region = env::var("APISIG_AWS_V4_REGION").unwrap_or_else(|_| "eu-west-2".to_string());
    let service =
        env::var("APISIG_AWS_V4_SERVICE").unwrap_or_else(|_| "execute-api".to_string());
    let url = env::var("APISIG_AWS_V4_URL").expect("APISIG_AWS_V4_URL must be set");

    Some((RequestSigner::new(&service, &region), url))
}

/// Send a request and return its status and body.
pub async fn send_request(req: Request<String>) -> Result<(StatusCode, String)> {
    debug!("sending request: {req:?}");

    let resp = Client::new().execute(req.try_into()?).await?;
    let status = resp.status();
    let body = resp.text().await?;

    debug!("response status: {status}, body: {body}");
    Ok((status, body))
}

/// Sign the request with headers then send it.
pub async fn send_signed_request(
    signer: &RequestSigner,
    req: Request<String>,
    cred: &Credential,
) -> Result<(StatusCode, String)> {
    let req = signer.sign(req, cred)?;
    send_request(req).await
}

/// The gateway answers 403 when it rejects the signature.
#[track_caller]
pub fn assert_signature_accepted(status: StatusCode, body: &str) {
    assert_ne!(StatusCode::FORBIDDEN, status, "signature rejected: {body}");
    assert_ne!(StatusCode::UNAUTHORIZED, status, "signature rejected: {body}");
}
