use forumhub_api::app::{self, AppOptions, AppServices};
use forumhub_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    forumhub_observability::init();

    let settings = Settings::load()?;
    let services = AppServices::from_settings(&settings.database).await?;
    let app = app::build_app(services, AppOptions::from(&settings));

    let listener = tokio::net::TcpListener::bind(settings.server.bind_address()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
