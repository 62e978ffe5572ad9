//! Server mode
//!
//! Builds the `LinkService`, starts the idle-bucket purger and runs the HTTP
//! server until it exits or a shutdown signal arrives.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api;
use crate::config::StaticConfig;
use crate::services::LinkService;
use crate::storage::{StorageFactory, StoreOptions};

/// Periodically drop rate limiter buckets that have been idle for
/// `idle_ttl`.
pub fn spawn_bucket_purger(
    service: web::Data<LinkService>,
    every: Duration,
    idle_ttl: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = service.purge_idle_clients(idle_ttl);
            if purged > 0 {
                debug!("Purged {} idle rate limiter buckets", purged);
            }
        }
    })
}

pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let store = StorageFactory::create(&config.storage, StoreOptions::from_config(&config.analytics))?;
    let service = web::Data::new(LinkService::bootstrap(store, config).await?);

    let purger = spawn_bucket_purger(
        service.clone(),
        Duration::from_secs(config.rate_limit.purge_interval_secs.max(1)),
        Duration::from_secs(config.rate_limit.idle_ttl_secs),
    );

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!(
        "cache capacity {}, rate limit {} req burst / {} per minute",
        config.cache.capacity, config.rate_limit.capacity, config.rate_limit.refill_per_minute
    );

    let app_service = service.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(app_service.clone())
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(api::configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(config.server.workers.max(1))
    .bind(&bind_address)?;

    warn!("Starting server at http://{}{}", bind_address, api::API_PREFIX);

    // actix-web 自带 SIGINT/SIGTERM 优雅停机
    let result = server.run().await;

    purger.abort();
    info!("Server stopped");
    result.map_err(anyhow::Error::from)
}
