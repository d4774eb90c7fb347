//! Demo binary: connects to the configured backend, loads the first page of brands and
//! shuts down.
//!
//! The config file is read from `BACKOFFICE_CONFIG` when set; otherwise defaults apply.
//! `BACKOFFICE_API_URL` overrides the backend URL either way.

use backoffice_store::clients::ResourceClient;
use backoffice_store::config::StoreConfig;
use backoffice_store::framework::ListQuery;
use backoffice_store::lifecycle::{setup_tracing, BackofficeStore};
use std::error::Error;
use tracing::{info, warn, Instrument};

const CONFIG_ENV: &str = "BACKOFFICE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => StoreConfig::load(path)?,
        Err(_) => StoreConfig::default(),
    }
    .with_env_overrides();
    info!(base_url = %config.api.base_url, app_id = %config.app_id, "Starting back office store");

    let store = BackofficeStore::connect(&config)?;
    if !store.session().current().is_authenticated() {
        info!("No stored session; requests go out unauthenticated");
    }

    let span = tracing::info_span!("brand_listing");
    let listed = async {
        info!("Loading brands");
        store.brands.list(ListQuery::new().page(0, 20)).await
    }
    .instrument(span)
    .await;

    match listed {
        Ok(brands) => {
            let state = store.brands.state();
            info!(loaded = brands.len(), total = ?state.total, "Brands loaded");
            for brand in &brands {
                info!(id = brand.id, name = %brand.name, "Brand");
            }
        }
        Err(e) => warn!(error = %e, "Could not load brands"),
    }

    store.shutdown().await?;
    Ok(())
}
