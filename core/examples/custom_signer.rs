use apisig_core::{
    Context, OsEnv, ProvideCredential, Result, SignRequest, Signer, SigningCredential,
    SigningMethod, SigningRequest,
};
use async_trait::async_trait;
use http::HeaderValue;

// Define a custom credential type
#[derive(Clone, Debug)]
struct ApiKey {
    key: String,
}

impl SigningCredential for ApiKey {
    fn is_valid(&self) -> bool {
        !self.key.is_empty()
    }
}

// Load the api key from the environment
#[derive(Debug)]
struct ApiKeyProvider;

#[async_trait]
impl ProvideCredential for ApiKeyProvider {
    type Credential = ApiKey;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let key = ctx.env_var("MY_API_KEY").unwrap_or_default();

        if key.is_empty() {
            println!("No MY_API_KEY found in environment, using demo key");
            return Ok(Some(ApiKey {
                key: "demo-api-key".to_string(),
            }));
        }

        Ok(Some(ApiKey { key }))
    }
}

// Put the api key into a header
#[derive(Debug)]
struct ApiKeySigner;

impl SignRequest for ApiKeySigner {
    type Credential = ApiKey;

    fn sign_request(
        &self,
        req: &mut SigningRequest<'_>,
        credential: &Self::Credential,
        method: SigningMethod,
    ) -> Result<()> {
        match method {
            SigningMethod::Header => {
                let mut value = HeaderValue::from_str(&credential.key)?;
                value.set_sensitive(true);
                req.headers.insert("x-api-key", value);
            }
            SigningMethod::Query(_) => req.query_push("api_key", credential.key.clone()),
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new().with_env(OsEnv);
    let signer = Signer::new(ctx, ApiKeyProvider, ApiKeySigner);

    let req = http::Request::get("https://api.example.com/items").body("")?;
    let req = signer.sign(req).await?;

    println!("Signed request: {} {}", req.method(), req.uri());
    println!("x-api-key present: {}", req.headers().contains_key("x-api-key"));

    Ok(())
}
