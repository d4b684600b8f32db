use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use maktaris_core_contact_contracts::ContactFeatureService;
use maktaris_core_health_contracts::HealthFeatureService;
use maktaris_di::Build;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone, Build)]
pub struct RestServer<Contact, Health> {
    contact: Contact,
    health: Health,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub allowed_origins: Vec<String>,
    pub real_ip: Option<Arc<RealIpConfig>>,
    pub production: bool,
}

/// Trust a client ip header only when the connection comes from `set_from`,
/// e.g. a reverse proxy in front of the service.
#[derive(Debug, Clone)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Contact, Health> RestServer<Contact, Health>
where
    Contact: ContactFeatureService,
    Health: HealthFeatureService,
{
    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router()?;
        let listener = TcpListener::bind((host, port)).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> anyhow::Result<Router<()>> {
        let Self {
            contact,
            health,
            config,
        } = self;

        let cors = cors_layer(&config.allowed_origins)?;

        let router = Router::new()
            .merge(routes::contact::router(contact.into(), config.production))
            .merge(routes::health::router(
                health.into(),
                environment(config.production),
            ))
            .fallback(routes::not_found);

        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(router, config.real_ip);
        let router = middlewares::request_id::add(router);
        let router = middlewares::panic_handler::add(router);

        Ok(router.layer(cors))
    }
}

fn environment(production: bool) -> &'static str {
    if production {
        "production"
    } else {
        "development"
    }
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin {origin:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
