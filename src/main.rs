#[macro_use]
extern crate rocket;

use log::info;
use rocket::fairing::AdHoc;
use std::env;

use trailbreaker::bot::Bot;
use trailbreaker::config::Config;
use trailbreaker::debug_logger::DebugLogger;

mod handler;

#[launch]
async fn rocket() -> _ {
    // Hosting services usually hand out the port through `PORT`; Rocket reads `ROCKET_PORT`.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // Default to 'info' logging unless `RUST_LOG` says otherwise.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Trailbreaker Server...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = Bot::with_logger(config, logger);

    rocket::build()
        .manage(bot)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "trailbreaker");
            })
        }))
        .mount(
            "/",
            routes![handler::index, handler::start, handler::decide, handler::end],
        )
}
