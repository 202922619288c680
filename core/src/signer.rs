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

use crate::{
    Context, Error, ProvideCredential, Result, SignRequest, SigningCredential, SigningMethod,
    SigningRequest,
};
use http::Request;
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sign an `http::Request` with the given signer and credential.
///
/// The request is consumed and a signed request is returned: method and body
/// are moved over untouched, headers (and the uri for query signing) are
/// replaced by the signed ones.
pub fn sign_http_request<S, B>(
    signer: &S,
    req: Request<B>,
    credential: &S::Credential,
    method: SigningMethod,
) -> Result<Request<B>>
where
    S: SignRequest + ?Sized,
    B: AsRef<[u8]>,
{
    let (mut parts, body) = req.into_parts();

    let mut signing_req = SigningRequest::build(&parts, body.as_ref())?;
    signer.sign_request(&mut signing_req, credential, method)?;
    signing_req.apply(&mut parts)?;

    Ok(Request::from_parts(parts, body))
}

/// Signer is the main struct used to sign the request.
///
/// It loads credential through the provider, keeps it until it's no longer
/// valid, and signs requests with it.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            provider: Arc::new(provider),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign the request with headers.
    pub async fn sign<B: AsRef<[u8]>>(&self, req: Request<B>) -> Result<Request<B>> {
        let cred = self.credential().await?;
        sign_http_request(&*self.builder, req, &cred, SigningMethod::Header)
    }

    /// Sign the request with query, the signature is valid for `expires_in`.
    pub async fn presign<B: AsRef<[u8]>>(
        &self,
        req: Request<B>,
        expires_in: Duration,
    ) -> Result<Request<B>> {
        let cred = self.credential().await?;
        sign_http_request(&*self.builder, req, &cred, SigningMethod::Query(expires_in))
    }

    async fn credential(&self) -> Result<K> {
        let cached = self.credential.lock().expect("lock poisoned").clone();
        if let Some(cred) = cached.filter(|v| v.is_valid()) {
            return Ok(cred);
        }

        let loaded = self.provider.provide_credential(&self.ctx).await?;
        debug!("credential loaded: {loaded:?}");
        *self.credential.lock().expect("lock poisoned") = loaded.clone();

        loaded.ok_or_else(|| Error::credential_invalid("no credential found by provider"))
    }
}
