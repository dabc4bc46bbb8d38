pub mod error;
pub mod tiers;

use crate::core::{config::RPCConfig, storage::CatalogStore, CatalogService};
use actix_web::{
    dev::ServerHandle,
    error::Error,
    get,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use anyhow::{Context, Result};
use fature_common::config::VERSION;
use log::{info, warn};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedTierRpcServer<S> = Arc<TierRpcServer<S>>;

pub struct TierRpcServer<S: CatalogStore> {
    handle: Mutex<Option<ServerHandle>>,
    service: Arc<CatalogService<S>>,
}

impl<S: CatalogStore> TierRpcServer<S> {
    pub async fn new(
        service: Arc<CatalogService<S>>,
        config: RPCConfig,
    ) -> Result<SharedTierRpcServer<S>> {
        let server = Arc::new(Self {
            handle: Mutex::new(None),
            service,
        });

        let prometheus = if config.prometheus.enable {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install Prometheus recorder")?;

            if log::log_enabled!(log::Level::Info) {
                info!(
                    "Prometheus metrics enabled on route: {}",
                    config.prometheus.route
                );
            }
            Some((config.prometheus.route, handle))
        } else {
            None
        };

        if config.bind_address.starts_with("0.0.0.0") {
            warn!("Tier RPC server is bound to 0.0.0.0 (all interfaces)");
            warn!("Catalog admin endpoints are exposed WITHOUT authentication");
            warn!("Use 127.0.0.1:8080 or restrict access with a firewall");
        }

        if log::log_enabled!(log::Level::Info) {
            info!("Starting RPC server on {}", config.bind_address);
        }

        {
            let service = Arc::clone(&server.service);
            let builder = HttpServer::new(move || {
                let mut app = App::new()
                    .app_data(Data::from(Arc::clone(&service)))
                    .app_data(Data::new(
                        prometheus.as_ref().map(|(_, handle)| handle.clone()),
                    ))
                    .configure(tiers::configure::<S>)
                    .service(index);

                if let Some((route, _)) = &prometheus {
                    app = app.route(route, web::get().to(prometheus_metrics));
                }
                app
            })
            .disable_signals()
            .bind(&config.bind_address)
            .with_context(|| format!("Failed to bind RPC server on {}", config.bind_address))?;

            let http_server = builder.workers(config.threads).run();

            {
                // save the server handle to be able to stop it later
                let handle = http_server.handle();
                let mut lock = server.handle.lock().await;
                *lock = Some(handle);
            }
            tokio::spawn(http_server);
        }

        Ok(server)
    }

    pub fn service(&self) -> &Arc<CatalogService<S>> {
        &self.service
    }

    pub async fn stop(&self) {
        info!("Stopping RPC Server...");
        let mut handle = self.handle.lock().await;
        if let Some(handle) = handle.take() {
            handle.stop(false).await;
            info!("RPC Server is now stopped!");
        } else {
            warn!("RPC Server is not running!");
        }
    }
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Fature tier service\nRunning on: {}",
        VERSION
    ))
}

async fn prometheus_metrics(handle: Data<Option<PrometheusHandle>>) -> Result<HttpResponse, Error> {
    Ok(match handle.as_ref() {
        Some(handle) => {
            let metrics = handle.render();
            HttpResponse::Ok()
                .content_type("text/plain; version=0.0.4")
                .body(metrics)
        }
        None => HttpResponse::NotFound().body("Prometheus metrics are not enabled"),
    })
}
