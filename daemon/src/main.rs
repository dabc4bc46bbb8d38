use anyhow::{Context, Result};
use clap::Parser;
use fature_common::config::VERSION;
use fature_daemon::{
    core::{config::Config, storage::JsonFileStore, CatalogService},
    logger,
    rpc::TierRpcServer,
};
use log::info;
use std::{path::Path, sync::Arc};

#[actix_web::main]
async fn main() -> Result<()> {
    let mut config: Config = Config::parse();
    if let Some(path) = config.config_file.clone() {
        if config.generate_config_template {
            if Path::new(&path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            config.write_template(&path)?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        config = Config::from_file(&path)?;
    } else if config.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    logger::setup_logger(&config.log)?;

    info!("Fature daemon v{} starting...", VERSION);

    let store = JsonFileStore::new(config.store.catalog_path());
    let service = CatalogService::load(store, !config.store.disable_default_seed)
        .await
        .context("Error while loading the tier catalog")?;
    let server = TierRpcServer::new(Arc::new(service), config.rpc).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Error while waiting for the shutdown signal")?;
    info!("Received shutdown signal");
    server.stop().await;

    Ok(())
}
