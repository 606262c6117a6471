use std::sync::Arc;

use backend_lib::{
    config::Settings,
    mailer::{BrevoMailer, Mailer, NoopMailer},
    repo::JsonFileRepo,
    router, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let accounts = JsonFileRepo::new(&config.data_file)?;

    // Without an API key the mailer only logs outbound messages.
    let mailer: Arc<dyn Mailer> = if config.mail.api_key.is_some() {
        Arc::new(BrevoMailer::new(&config.mail)?)
    } else {
        tracing::warn!("mail API key not set; contact form and password reset will not send email");
        Arc::new(NoopMailer)
    };

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::new(accounts, mailer, config));
    let app = router::create_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
