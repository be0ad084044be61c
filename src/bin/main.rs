use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use redis::Client as RedisClient;
use squad_arena_server::{
    config::settings,
    db::{MemoryStore, PgStore, Store},
    gate::{MemorySessions, RedisSessions, SessionStore},
    http, metrics, AppState,
};
use std::{env, sync::Arc, time::Duration};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = settings().clone();
    let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Store: Postgres when configured, otherwise in-memory
    let store: Arc<dyn Store> = match env::var("DATABASE_URL") {
        Ok(url) => {
            let pg = PgStore::connect(&url)
                .await
                .context("failed to create Postgres pool")?;
            pg.migrate().await.context("schema migration failed")?;
            Arc::new(pg)
        }
        Err(_) => {
            log::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    // Sessions: Redis when configured, otherwise in-memory
    let sessions: Arc<dyn SessionStore> = match env::var("REDIS_URL") {
        Ok(url) => {
            let client = RedisClient::open(url.as_str()).context("invalid REDIS_URL")?;
            Arc::new(RedisSessions::new(client, settings.session_ttl))
        }
        Err(_) => {
            let ttl = Duration::from_secs(settings.session_ttl);
            Arc::new(MemorySessions::new(ttl))
        }
    };

    // The match config singleton exists before the first request.
    store
        .ensure_config()
        .await
        .context("failed to initialise match config")?;

    if settings.admin_secret.is_some() {
        log::warn!("ADMIN_SECRET is set: logging in with it promotes the account to admin");
    }

    let state = web::Data::new(AppState::new(store, sessions, settings));

    log::info!("listening on {server_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(state.clone())
            .configure(http::routes::init_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
