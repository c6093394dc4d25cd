use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use four_in_a_row::ai::create_bot;
use four_in_a_row::config::{EngineConfig, ServerConfig};
use four_in_a_row::middleware::StructuredLogger;
use four_in_a_row::routes;
use four_in_a_row::services::InMemoryLeaderboard;
use four_in_a_row::state::AppState;

mod telemetry;

const DEFAULT_BOT: &str = "heuristic";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let server = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("❌ {e}");
        std::process::exit(1);
    });
    let engine = EngineConfig::from_env().unwrap_or_else(|e| {
        eprintln!("❌ {e}");
        std::process::exit(1);
    });

    let Some(bot) = create_bot(DEFAULT_BOT, engine.bot_seed) else {
        eprintln!("❌ Unknown bot strategy '{DEFAULT_BOT}'");
        std::process::exit(1);
    };

    println!(
        "🚀 Starting four-in-a-row on http://{}:{}",
        server.host, server.port
    );

    let app_state = AppState::start(engine, bot, Arc::new(InMemoryLeaderboard::new()));
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
