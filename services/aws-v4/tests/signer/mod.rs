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

//! Offline tests for the signer orchestrator wired with aws providers.

use anyhow::Result;
use apisig_aws_v4::{
    Config, DefaultCredentialProvider, EnvCredentialProvider, RequestSigner,
    StaticCredentialProvider, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY,
};
use apisig_core::time::parse_iso8601;
use apisig_core::{Context, ErrorKind, Signer, StaticEnv};
use http::{header, Request};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const ITEMS_URL: &str = "https://example.execute-api.eu-west-2.amazonaws.com/items";

fn request_signer() -> RequestSigner {
    RequestSigner::new("execute-api", "eu-west-2")
        .with_time(parse_iso8601("20230101T000000Z").expect("time must be valid"))
}

fn collection_env() -> StaticEnv {
    StaticEnv::from_pairs([
        ("awsAccessKeyId", "AKIDEXAMPLE"),
        ("awsSecretAccessKey", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
        ("awsSessionToken", ""),
    ])
}

#[tokio::test]
async fn test_sign_with_collection_env_names() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = EnvCredentialProvider::new()
        .with_access_key_id_var("awsAccessKeyId")
        .with_secret_access_key_var("awsSecretAccessKey")
        .with_session_token_var("awsSessionToken");
    let signer = Signer::new(
        Context::new().with_env(collection_env()),
        provider,
        request_signer(),
    );

    let req = signer.sign(Request::get(ITEMS_URL).body("")?).await?;
    assert_eq!(
        req.headers()[header::AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20230101/eu-west-2/execute-api/aws4_request, SignedHeaders=host;x-amz-date, Signature=331d182f598a454633e09be598a1c15e71f06b715cf6168d781f427ff8c06313"
    );
    assert!(req.headers().get("x-amz-security-token").is_none());
    Ok(())
}

#[tokio::test]
async fn test_sign_items_requests() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
            .with_session_token("session-token-example"),
        request_signer(),
    );

    let requests = [
        Request::get(ITEMS_URL).body(String::new())?,
        Request::post(ITEMS_URL)
            .header(header::CONTENT_TYPE, "application/json")
            .body(r#"{"id":"1","name":"apple"}"#.to_string())?,
        Request::get(format!("{ITEMS_URL}/1")).body(String::new())?,
        Request::delete(format!("{ITEMS_URL}/1")).body(String::new())?,
    ];

    for req in requests {
        let (method, uri, body) = (req.method().clone(), req.uri().clone(), req.body().clone());
        let header_count = req.headers().len();

        let req = signer.sign(req).await?;
        assert_eq!(req.method(), method);
        assert_eq!(req.uri(), &uri);
        assert_eq!(req.body(), &body);
        assert_eq!(req.headers().len(), header_count + 3);
        assert_eq!(req.headers()["x-amz-date"], "20230101T000000Z");
        assert_eq!(req.headers()["x-amz-security-token"], "session-token-example");
        assert!(req.headers()[header::AUTHORIZATION]
            .to_str()?
            .contains("SignedHeaders="));
    }
    Ok(())
}

#[tokio::test]
async fn test_presign_with_default_provider() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        (AWS_ACCESS_KEY_ID, "AKIDEXAMPLE"),
        (AWS_SECRET_ACCESS_KEY, "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
        ("AWS_REGION", "eu-west-2"),
    ]));
    let config = Config::default().from_env(&ctx);
    let request_signer = RequestSigner::from_config("execute-api", &config)?
        .with_time(parse_iso8601("20230101T000000Z")?);
    let signer = Signer::new(
        ctx,
        DefaultCredentialProvider::new(Arc::new(config)),
        request_signer,
    );

    let req = signer
        .presign(Request::get(ITEMS_URL).body("")?, Duration::from_secs(300))
        .await?;
    let query = req.uri().query().unwrap_or_default();
    assert!(query.starts_with(
        "X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential=AKIDEXAMPLE%2F20230101%2Feu-west-2%2Fexecute-api%2Faws4_request&X-Amz-Date=20230101T000000Z&X-Amz-Expires=300&X-Amz-SignedHeaders=host&X-Amz-Signature="
    ));
    assert!(req.headers().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sign_without_credential() -> Result<()> {
    let signer = Signer::new(
        Context::new(),
        EnvCredentialProvider::new(),
        request_signer(),
    );

    let err = signer
        .sign(Request::get(ITEMS_URL).body("")?)
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    Ok(())
}
