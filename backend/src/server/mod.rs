//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, RuntimeConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use social::Trace;
#[cfg(debug_assertions)]
use social::doc::ApiDoc;
use social::inbound::http::configure_api;
use social::inbound::http::health::{self, HealthState};
use social::inbound::http::state::HttpState;
use social::outbound::persistence::DbPool;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .configure(configure_api)
                .configure(health::configure),
        );

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server over `pool`.
///
/// The readiness probe flips to ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    pool: &DbPool,
    config: &RuntimeConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(pool, config));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    info!(addr = %config.bind_addr, role_cache = config.role_cache, "server listening");
    Ok(server)
}
