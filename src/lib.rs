pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use std::sync::Arc;

use actix_web::{http::Method, middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;

use application::order_service::OrderService;
use domain::ports::MailDispatcher;
use infrastructure::smtp_mailer::SmtpMailer;

pub use config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::orders::submit_order, handlers::orders::preflight),
    components(schemas(
        handlers::orders::OrderRequest,
        handlers::orders::OrderAcceptedResponse,
        errors::ErrorResponse
    )),
    tags((name = "orders", description = "Order submission relayed to the administrator by email"))
)]
pub struct ApiDoc;

/// Build the order pipeline for `config`.
///
/// Without both an SMTP user and password the service runs in dry-run mode
/// and never opens an SMTP session.
pub fn order_service(config: &Config) -> OrderService {
    let mailer = config.smtp.credentials().map(|credentials| {
        Arc::new(SmtpMailer::new(&config.smtp, credentials)) as Arc<dyn MailDispatcher>
    });
    OrderService::new(config, mailer)
}

/// Register the order endpoint and the OpenAPI document.
///
/// The caller provides the `web::Data<OrderService>` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(
        handlers::orders::MAX_ORDER_BODY_BYTES,
    ))
    .service(
        web::resource("/")
            .route(web::post().to(handlers::orders::submit_order))
            .route(web::method(Method::OPTIONS).to(handlers::orders::preflight))
            .default_service(web::to(handlers::orders::method_not_allowed)),
    )
    .route(
        "/api-docs/openapi.json",
        web::get().to(handlers::orders::openapi_json),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server.
pub fn build_server(
    config: Config,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(order_service(&config));
    if service.is_dry_run() {
        log::warn!("SMTP_USER or SMTP_PASSWORD is empty, orders will not be mailed");
    }

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
