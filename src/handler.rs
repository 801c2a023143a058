// HTTP handler bindings for the host API endpoints
//
// Thin wrappers binding Rocket routes to the Bot's methods. Handlers deserialize the
// request, pull the Bot out of Rocket's managed state, delegate, and serialize the answer.

use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::Value;

use trailbreaker::bot::{Bot, Decision};
use trailbreaker::types::{EndRequest, StartRequest, WorldSnapshot};

/// GET / endpoint
/// Returns bot metadata
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
/// Receives the game constants once before the first decision
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<StartRequest>) -> Status {
    bot.start(&start_req);

    Status::Ok
}

/// POST /decide endpoint
/// Called each cycle with the full world snapshot
#[post("/decide", format = "json", data = "<snapshot>")]
pub async fn decide(
    bot: &rocket::State<Bot>,
    snapshot: Json<WorldSnapshot>,
) -> Result<Json<Decision>, (Status, String)> {
    bot.decide(&snapshot)
        .await
        .map(Json)
        .map_err(|e| (Status::UnprocessableEntity, e))
}

/// POST /end endpoint
/// Called when a game ends
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<EndRequest>) -> Status {
    bot.end(&end_req);

    Status::Ok
}
