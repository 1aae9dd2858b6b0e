pub mod handlers;

use anyhow::Result;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::datastore::TaskDataStore;
use crate::service::TaskService;

pub struct ServerConfig {
    pub host: Option<String>,
    pub port: u16,
    pub allowed_origin: String,
}

pub struct Server<D> {
    config: ServerConfig,
    service: TaskService<D>,
}

impl<D> Server<D>
where
    D: TaskDataStore,
{
    pub fn new(config: ServerConfig, service: TaskService<D>) -> Server<D> {
        Server { config, service }
    }

    pub async fn start(self) -> Result<()> {
        info!("Starting api...");
        let host: IpAddr = match &self.config.host {
            Some(host) => match host.parse() {
                Ok(host) => host,
                Err(err) => {
                    error!(reason=%err.to_string(), host=%host, "Invalid listen host.");
                    anyhow::bail!("Unable to start API.")
                }
            },
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let saddr = SocketAddr::new(host, self.config.port);

        let cors = match cors_layer(&self.config.allowed_origin) {
            Ok(cors) => cors,
            Err(err) => {
                error!(reason=%err.to_string(), "Invalid allowed origin.");
                anyhow::bail!("Unable to start API.")
            }
        };
        let app = handlers::router(self.service).layer(cors);

        match axum::Server::bind(&saddr)
            .serve(app.into_make_service())
            .await
        {
            Ok(_) => (),
            Err(err) => {
                error!(reason=%err.to_string(), "Unable to start API.");
                anyhow::bail!("Unable to start API.")
            }
        }
        Ok(())
    }
}

/// Browser clients live on a single configured origin.
fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true))
}
