use anyhow::Result;
use apisig_aws_v4::{EnvCredentialProvider, RequestSigner, StaticCredentialProvider};
use apisig_core::{Context, OsEnv, ProvideCredential, Signer};
use http::header;
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for debugging
    env_logger::init();

    let ctx = Context::new().with_env(OsEnv);

    // Keys are kept under the API collection's own variable names.
    let loader = EnvCredentialProvider::new()
        .with_access_key_id_var("awsAccessKeyId")
        .with_secret_access_key_var("awsSecretAccessKey")
        .with_session_token_var("awsSessionToken");

    let builder = RequestSigner::new("execute-api", "eu-west-2");

    let signer = if loader.provide_credential(&ctx).await?.is_none() {
        println!("No awsAccessKeyId/awsSecretAccessKey found, using demo credentials for example");
        let static_provider = StaticCredentialProvider::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        );
        Signer::new(ctx, static_provider, builder)
    } else {
        Signer::new(ctx, loader, builder)
    };

    // Requests are only sent when the api url is provided.
    let base = std::env::var("ITEMS_API_URL").ok();
    let url = base
        .clone()
        .unwrap_or_else(|| "https://example.execute-api.eu-west-2.amazonaws.com/prod".to_string());
    let client = Client::new();

    let requests = [
        http::Request::get(format!("{url}/items")).body(String::new())?,
        http::Request::post(format!("{url}/items"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(r#"{"id":"1","name":"apple"}"#.to_string())?,
        http::Request::get(format!("{url}/items/1")).body(String::new())?,
        http::Request::delete(format!("{url}/items/1")).body(String::new())?,
    ];

    for req in requests {
        let req = match signer.sign(req).await {
            Ok(req) => req,
            Err(e) => {
                eprintln!("Failed to sign request: {e}");
                continue;
            }
        };

        println!("\n{} {}", req.method(), req.uri());
        println!(
            "Authorization header: {:?}",
            req.headers().get(header::AUTHORIZATION)
        );
        println!("X-Amz-Date header: {:?}", req.headers().get("x-amz-date"));

        if base.is_none() {
            println!("Demo mode: Not sending actual request to AWS");
            continue;
        }

        let resp = client.execute(req.try_into()?).await?;
        println!("Response status: {}", resp.status());
        println!("Response body: {}", resp.text().await?);
    }

    Ok(())
}
