use attribflow_api::ApiContext;
use lambda_http::{Error, Request, run, service_fn};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting Attribflow API Lambda function");

    // Initialize API context
    let ctx = ApiContext::new().await?;

    // Run the Lambda runtime with our handler
    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { attribflow_api::handler(ctx, event).await }
    }))
    .await
}
