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

use super::{
    assert_signature_accepted, init_signing_test, load_static_credential, send_signed_request,
};
use anyhow::Result;
use http::{Method, Request};
use log::warn;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

#[tokio::test]
async fn test_get_item_with_special_characters() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("APISIG_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let cred = load_static_credential()?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(format!(
            "{}/items/{}",
            url,
            utf8_percent_encode("!@#$%^&*()_+-=;:'><,?.txt", NON_ALPHANUMERIC)
        ))
        .body(String::new())?;

    let (status, body) = send_signed_request(&signer, req, &cred).await?;
    assert_signature_accepted(status, &body);
    Ok(())
}

#[tokio::test]
async fn test_get_item_with_unicode_characters() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("APISIG_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let cred = load_static_credential()?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(format!(
            "{}/items/{}?name={}",
            url,
            utf8_percent_encode("pomme-à-cidre", NON_ALPHANUMERIC),
            utf8_percent_encode("crème brûlée", NON_ALPHANUMERIC)
        ))
        .body(String::new())?;

    let (status, body) = send_signed_request(&signer, req, &cred).await?;
    assert_signature_accepted(status, &body);
    Ok(())
}
