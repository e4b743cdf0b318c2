use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discovery::catalog::CatalogRepository;
use discovery::cms::{CmsClient, CmsConfig, CmsHttpClient, NoopCmsClient};
use discovery::partner::{NoopPartnerClient, PartnerClient, PartnerConfig, PartnerHttpClient};
use discovery::routes::router;
use discovery::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "discovery=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog_path =
        std::env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.json".to_string());
    let catalog = Arc::new(CatalogRepository::from_json_file(&catalog_path)?);
    info!(
        "loaded catalog from {} ({} institutions)",
        catalog_path,
        catalog.institution_count()
    );

    let cms: Arc<dyn CmsClient> = match CmsConfig::new_from_env() {
        Ok(config) => Arc::new(CmsHttpClient::new(config)?),
        Err(e) => {
            warn!("CMS disabled: {}", e);
            Arc::new(NoopCmsClient)
        }
    };

    let partner: Arc<dyn PartnerClient> = match PartnerConfig::new_from_env() {
        Ok(config) => Arc::new(PartnerHttpClient::new(config)?),
        Err(e) => {
            warn!("Partner system disabled: {}", e);
            Arc::new(NoopPartnerClient)
        }
    };

    let state = AppState { catalog, cms, partner };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
