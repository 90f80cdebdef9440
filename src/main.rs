use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use couture_backend::auth::middleware::{USER_ID_HEADER, USER_ROLE_HEADER};
use couture_backend::config::Config;
use couture_backend::{Engine, create_pool, handlers};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    Migrator::up(&db, None)
        .await
        .map_err(std::io::Error::other)?;
    tracing::info!("Database migrations applied");

    tracing::info!(
        shortlist_size = config.engine.shortlist_size,
        offer_window_hours = config.engine.offer_window.num_hours(),
        ranking = %config.engine.ranking,
        "Engine configured"
    );
    let engine = web::Data::new(Engine::new(db, config.engine.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .allowed_header(USER_ID_HEADER)
            .allowed_header(USER_ROLE_HEADER)
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(engine.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
