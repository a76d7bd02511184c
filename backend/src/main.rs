use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

use backend::config::AppConfig;
use backend::{db, services};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    if let Err(e) = db::init(&config.db_path) {
        return Err(std::io::Error::other(format!("database init failed: {}", e)));
    }

    info!("Server running at http://{}:{}", config.host, config.port);

    let bind_addr = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(config.clone())
            .service(services::albums::configure_routes())
            .service(services::reports::configure_routes())
    })
    .bind(bind_addr)?
    .run()
    .await
}
