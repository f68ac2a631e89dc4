use dotenvy::dotenv;
use storefront::build_server;
use storefront::build_services;
use storefront::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let services = build_services(&config).map_err(std::io::Error::other)?;

    log::info!("Starting server at http://{}", config.addr());

    build_server(services, &config.host, config.port)?.await
}
