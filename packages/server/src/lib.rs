#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the rule map.
//!
//! Every request to `/api/rules` runs one full reload-filter-render cycle:
//! the segment dropdowns are resolved, the matching rule table is read from
//! disk, and the filtered rules come back as a display table plus map
//! primitives (or as `GeoJSON` from `/api/rules.geojson`). Nothing is cached
//! between requests.

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use rule_map_store::RuleStore;
use rule_map_store::paths::TableFormat;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Rule table reader.
    pub store: RuleStore,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/segments", web::get().to(handlers::segments))
            .route("/sites", web::get().to(handlers::sites))
            .route("/legend", web::get().to(handlers::legend))
            .route("/locations", web::get().to(handlers::locations))
            .route("/rules", web::get().to(handlers::rules))
            .route("/rules.geojson", web::get().to(handlers::rules_geojson)),
    );
}

/// Starts the rule map API server.
///
/// Reads rule tables from [`RuleStore::from_env`] and binds to `BIND_ADDR`
/// / `PORT` (defaults `127.0.0.1:8080`). The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::try_init_custom_env("RUST_LOG").ok();

    let store = RuleStore::from_env();
    log::info!("Reading rule tables from {}", store.data_dir().display());
    for (segment, available) in store.available_segments() {
        if !available {
            log::warn!(
                "No rule table for segment {segment} at {} (or .csv)",
                store.table_path(segment, TableFormat::Xlsx).display()
            );
        }
    }

    let state = web::Data::new(AppState { store });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
