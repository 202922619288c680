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

use crate::{constants::*, Credential};
use apisig_core::time::parse_rfc3339;
use apisig_core::{Context, Error, ProvideCredential, Result};
use async_trait::async_trait;
use log::debug;

/// EnvCredentialProvider loads AWS credentials from environment variables.
///
/// By default this provider looks for the following environment variables:
/// - `AWS_ACCESS_KEY_ID`: The AWS access key ID
/// - `AWS_SECRET_ACCESS_KEY`: The AWS secret access key
/// - `AWS_SESSION_TOKEN`: The AWS session token (optional)
/// - `AWS_CREDENTIAL_EXPIRATION`: RFC 3339 expiration time (optional)
///
/// Every name can be replaced, which is how collections that keep keys
/// under their own variable names are wired in.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    access_key_id_var: String,
    secret_access_key_var: String,
    session_token_var: String,
    expiration_var: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider reading the standard AWS variables.
    pub fn new() -> Self {
        Self {
            access_key_id_var: AWS_ACCESS_KEY_ID.to_string(),
            secret_access_key_var: AWS_SECRET_ACCESS_KEY.to_string(),
            session_token_var: AWS_SESSION_TOKEN.to_string(),
            expiration_var: AWS_CREDENTIAL_EXPIRATION.to_string(),
        }
    }

    /// Read the access key id from `name` instead.
    pub fn with_access_key_id_var(mut self, name: &str) -> Self {
        self.access_key_id_var = name.to_string();
        self
    }

    /// Read the secret access key from `name` instead.
    pub fn with_secret_access_key_var(mut self, name: &str) -> Self {
        self.secret_access_key_var = name.to_string();
        self
    }

    /// Read the session token from `name` instead.
    pub fn with_session_token_var(mut self, name: &str) -> Self {
        self.session_token_var = name.to_string();
        self
    }

    /// Read the expiration time from `name` instead.
    pub fn with_expiration_var(mut self, name: &str) -> Self {
        self.expiration_var = name.to_string();
        self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty());

        let (Some(ak), Some(sk)) = (
            get(self.access_key_id_var.as_str()),
            get(self.secret_access_key_var.as_str()),
        ) else {
            debug!(
                "{} or {} is not set, skip loading credential from env",
                self.access_key_id_var, self.secret_access_key_var
            );
            return Ok(None);
        };

        let expires_in = match get(self.expiration_var.as_str()) {
            Some(v) => Some(parse_rfc3339(v).map_err(|e| {
                Error::config_invalid(format!("{} is not a valid RFC 3339 time", self.expiration_var))
                    .with_source(e)
            })?),
            None => None,
        };

        Ok(Some(Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: get(self.session_token_var.as_str()).cloned(),
            expires_in,
        }))
    }
}
