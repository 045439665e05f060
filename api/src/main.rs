//! Bookline API server entry point.

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use bl_api::app;
use bl_api::routes::qr::AppState;
use bl_core::services::{
    ActionRegistry, Notifier, QrServiceConfig, QrTokenService, QrTokenSweeper, SweepConfig,
    SystemClock,
};
use bl_infra::{
    HttpMailer, LogOnlyNotifier, MailerConfig, MySqlAppointmentRepository,
    MySqlPaymentRepository, MySqlQrTokenRepository, SvgQrRenderer,
};
use bl_shared::config::{QrFlowConfig, ServerConfig};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("starting Bookline API server");

    let server_config = ServerConfig::from_env();
    let flow_config = QrFlowConfig::from_env();
    let service_config =
        QrServiceConfig::from_flow_config(&flow_config).map_err(io_error)?;

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "DATABASE_URL is not set"))?;
    let pool = bl_infra::database::create_pool(&database_url)
        .await
        .map_err(io_error)?;

    let token_repo = Arc::new(MySqlQrTokenRepository::new(pool.clone()));
    let appointment_repo = Arc::new(MySqlAppointmentRepository::new(pool.clone()));
    let payment_repo = Arc::new(MySqlPaymentRepository::new(pool));

    let registry = Arc::new(ActionRegistry::with_defaults(
        appointment_repo.clone(),
        payment_repo,
    ));
    let clock = Arc::new(SystemClock);

    let qr_service = Arc::new(QrTokenService::new(
        token_repo.clone(),
        appointment_repo,
        registry.clone(),
        clock.clone(),
        service_config,
    ));

    let sweeper = Arc::new(QrTokenSweeper::new(
        token_repo,
        registry,
        clock,
        SweepConfig::default(),
    ));
    let _sweep_task = sweeper.start();

    let notifier: Arc<dyn Notifier> = match MailerConfig::from_env() {
        Some(config) => Arc::new(HttpMailer::new(config).map_err(io_error)?),
        None => {
            warn!("MAIL_RELAY_URL not set, token notifications will only be logged");
            Arc::new(LogOnlyNotifier)
        }
    };

    let state = web::Data::new(AppState {
        qr_service,
        renderer: Arc::new(SvgQrRenderer::new()),
        notifier,
        flow: flow_config,
    });

    let bind_address = server_config.bind_address();
    info!(address = %bind_address, "server binding");

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(app::create_cors())
            .configure(app::configure(state.clone()))
    });

    if server_config.workers > 0 {
        server = server.workers(server_config.workers);
    }

    server.bind(&bind_address)?.run().await
}

fn io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
