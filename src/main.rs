use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use scanquiz_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("PRODUCTION").is_ok() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");

    log::info!("Starting game host on {}:{}", host, port);

    HttpServer::new(move || {
        // Phones hit the scan callout from whatever origin the QR encodes
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .service(handlers::scan_callout)
            .service(handlers::relay_message)
            .service(handlers::room_state)
            .service(handlers::start_round)
            .service(handlers::health)
    })
    .bind((host, port))?
    .run()
    .await
}
