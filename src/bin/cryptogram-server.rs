use cryptogram_demo::{ServerConfig, init_tracing, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ServerConfig::load()?;
    let (listener, addr) = server::bind(&config).await?;
    tracing::info!("cryptogram server listening on {}", addr);

    server::serve(listener, &config).await?;

    Ok(())
}
