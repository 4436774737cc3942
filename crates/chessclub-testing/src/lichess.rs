//! Rating-provider response fixtures.

use chessclub_domain::game::GameType;
use serde_json::{Map, Value, json};

/// One user object as returned by the rating provider's bulk users endpoint.
pub fn user_json(username: &str, ratings: &[(GameType, i32)], disabled: bool) -> Value {
    let perfs: Map<String, Value> = ratings
        .iter()
        .map(|(game, rating)| {
            (
                game.as_str().to_owned(),
                json!({ "games": 10, "rating": rating, "rd": 60, "prog": 0 }),
            )
        })
        .collect();
    let mut user = json!({ "id": username.to_lowercase(), "username": username, "perfs": perfs });
    if disabled {
        user["disabled"] = Value::Bool(true);
    }
    user
}

/// Newline-delimited JSON body built from `users`.
pub fn ndjson(users: &[Value]) -> String {
    users
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
