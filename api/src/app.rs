//! Application wiring: route table and CORS policy.

use actix_cors::Cors;
use actix_web::{http, web};

use bl_core::repositories::{AppointmentRepository, QrTokenRepository};

use crate::routes;
use crate::routes::qr::AppState;

/// Build the route table closure for `App::configure`
///
/// Generic over the repository implementations so tests can mount the
/// same table on in-memory state.
pub fn configure<T, A>(
    state: web::Data<AppState<T, A>>,
) -> impl FnOnce(&mut web::ServiceConfig)
where
    T: QrTokenRepository + 'static,
    A: AppointmentRepository + 'static,
{
    move |cfg| {
        cfg.app_data(state)
            .route("/health", web::get().to(routes::health::health_check))
            // Public scan landing; the token string is the credential
            .route(
                "/r/{token}",
                web::get().to(routes::qr::redeem::redeem::<T, A>),
            )
            .service(
                web::scope("/api/v1/qr")
                    .route(
                        "/tokens",
                        web::post().to(routes::qr::issue::issue_token::<T, A>),
                    )
                    .route(
                        "/tokens/{token}",
                        web::get().to(routes::qr::info::token_info::<T, A>),
                    )
                    .route(
                        "/tokens/{token}/image",
                        web::get().to(routes::qr::image::token_image::<T, A>),
                    ),
            );
    }
}

/// CORS policy for the API
///
/// Allowed origins come from `CORS_ALLOWED_ORIGINS` (comma separated);
/// an unset variable falls back to permissive, for development.
pub fn create_cors() -> Cors {
    match std::env::var("CORS_ALLOWED_ORIGINS") {
        Ok(origins) => {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST"])
                .allowed_headers(vec![
                    http::header::CONTENT_TYPE,
                    http::header::ACCEPT,
                ])
                .allowed_header("X-Caller-Id")
                .allowed_header("X-Caller-Privileged")
                .max_age(3600);

            for origin in origins.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                cors = cors.allowed_origin(origin);
            }
            cors
        }
        Err(_) => Cors::permissive(),
    }
}
