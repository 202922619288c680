//! AWS SigV4 signer for API client requests.
//!
//! ## Example
//!
//! ```no_run
//! use apisig_aws_v4::{Credential, RequestSigner};
//!
//! # fn example() -> apisig_core::Result<()> {
//! let signer = RequestSigner::new("execute-api", "eu-west-2");
//! let cred = Credential::new("access_key_id", "secret_access_key");
//!
//! let req = http::Request::get("https://example.execute-api.eu-west-2.amazonaws.com/items")
//!     .body("")?;
//! let req = signer.sign(req, &cred)?;
//! assert!(req.headers().contains_key("authorization"));
//! # Ok(())
//! # }
//! ```
//!
//! Use [`apisig_core::Signer`] with a [`DefaultCredentialProvider`] to load
//! and cache credentials from the environment instead.

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

mod constants;
pub use constants::{
    AWS_ACCESS_KEY_ID, AWS_CREDENTIAL_EXPIRATION, AWS_DEFAULT_REGION, AWS_REGION,
    AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
};
