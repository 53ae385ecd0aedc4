use hokm_server::{HokmServer, ServerError};
use hokm_session::GuestAuthenticator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("HOKM_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = HokmServer::<GuestAuthenticator>::builder()
        .bind(&addr)
        .build(GuestAuthenticator)
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await
}
