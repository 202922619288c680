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

use super::{assert_signature_accepted, init_signing_test, load_static_credential, send_request};
use anyhow::Result;
use http::{Method, Request};
use log::{debug, warn};
use std::time::Duration;

#[tokio::test]
async fn test_list_items_with_presigned_url() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("APISIG_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let cred = load_static_credential()?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(format!("{url}/items"))
        .body(String::new())?;
    let req = signer.presign(req, &cred, Duration::from_secs(3600))?;
    debug!("presigned url: {}", req.uri());
    assert!(req.headers().is_empty());

    let (status, body) = send_request(req).await?;
    assert_signature_accepted(status, &body);
    Ok(())
}

#[tokio::test]
async fn test_get_item_with_presigned_url() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("APISIG_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let cred = load_static_credential()?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(format!("{url}/items/apisig-test?fields=name"))
        .body(String::new())?;
    let req = signer.presign(req, &cred, Duration::from_secs(60))?;
    debug!("presigned url: {}", req.uri());

    let (status, body) = send_request(req).await?;
    assert_signature_accepted(status, &body);
    Ok(())
}
