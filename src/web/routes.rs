use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::middleware::DefaultHeaders;
use actix_web::web;
use log::debug;
use std::path::Path;

use crate::error::ApiError;
use crate::web::handlers;
use crate::web::models::{CONTACT_FIELDS_REQUIRED, MESSAGES_REQUIRED};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(cors_headers())
            .service(
                web::resource("/chat")
                    .app_data(json_config(MESSAGES_REQUIRED))
                    .route(web::post().to(handlers::chat))
                    .route(web::method(Method::OPTIONS).to(handlers::preflight))
                    .default_service(web::to(handlers::method_not_allowed)),
            )
            .service(
                web::resource("/contact")
                    .app_data(json_config(CONTACT_FIELDS_REQUIRED))
                    .route(web::post().to(handlers::contact))
                    .route(web::method(Method::OPTIONS).to(handlers::preflight))
                    .default_service(web::to(handlers::method_not_allowed)),
            ),
    )
    .route("/health", web::get().to(handlers::health_check));
}

/// Serves the built front end. Paths the bundle does not contain fall back to
/// `index.html` so client-side routes resolve.
pub fn site(dir: &Path) -> Files {
    let index = dir.join("index.html");
    Files::new("/", dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}

fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

// Any body that does not fit the payload shape gets the endpoint's own message
fn json_config(message: &'static str) -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(move |err, _req| {
            debug!("Rejected payload: {}", err);
            ApiError::InvalidPayload(message.to_string()).into()
        })
}
