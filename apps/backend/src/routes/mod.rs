use actix_web::web;

pub mod health;
pub mod realtime;

/// Register every public route. Used by `main.rs` and the test servers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Match websocket: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
