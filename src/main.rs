use std::io;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

mod config;
mod csrf;
mod db;
mod errors;
mod handlers;
mod models;
mod templates;

use config::Config;
use csrf::CsrfSigner;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("Connecting to database at {}...", config.database_url);
    let pool = db::get_db_pool(&config.database_url).await.map_err(|e| {
        log::error!("Failed to create pool: {e}");
        io::Error::other(e)
    })?;

    log::info!("Creating cafe table if missing...");
    db::run_migrations(&pool).await.map_err(|e| {
        log::error!("Failed to run migrations: {e}");
        io::Error::other(e)
    })?;

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let pool_data = web::Data::new(pool);
    let csrf_data = web::Data::new(CsrfSigner::new(&config.secret_key));
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(csrf_data.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(bind)?
    .run()
    .await
}
