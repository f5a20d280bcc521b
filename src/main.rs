mod config;
mod error;
mod mail;
mod model;
mod web;

use actix_web::middleware::Logger;
use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

use config::Config;
use mail::{Mailer, ResendMailer, Templates};
use model::{ChatCompletion, GeminiModel};
use web::routes;

// App state structure
struct AppState {
    config: Config,
    model: Option<Arc<dyn ChatCompletion>>,
    mailer: Option<Arc<dyn Mailer>>,
    templates: Templates,
}

impl AppState {
    fn new(config: Config) -> anyhow::Result<Self> {
        let model = config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiModel::new(
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )) as Arc<dyn ChatCompletion>
        });
        if model.is_none() {
            warn!("GEMINI_API_KEY is not set; /api/chat will answer with a configuration error");
        }

        let mailer = config.resend_api_key.as_ref().map(|key| {
            Arc::new(ResendMailer::new(key.clone(), config.resend_base_url.clone()))
                as Arc<dyn Mailer>
        });
        if mailer.is_none() {
            warn!("RESEND_API_KEY is not set; /api/contact will answer with a configuration error");
        }

        Ok(Self {
            templates: Templates::new()?,
            config,
            model,
            mailer,
        })
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Graphic Define web server");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded configuration: {:?}", config);

    let bind = (config.host.clone(), config.port);
    let static_dir = Some(config.static_dir.clone()).filter(|dir| dir.is_dir());
    match &static_dir {
        Some(dir) => info!("Serving front end from {}", dir.display()),
        None => warn!(
            "Static directory {} not found; serving the API only",
            config.static_dir.display()
        ),
    }

    let app_state = match AppState::new(config) {
        Ok(state) => Data::new(state),
        Err(e) => {
            error!("Failed to initialize application state: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure);
        match &static_dir {
            Some(dir) => app.service(routes::site(dir)),
            None => app,
        }
    })
    .bind(bind)?
    .run()
    .await
}
