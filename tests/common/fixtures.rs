//! Homework API payloads used across tests

use serde_json::{Value, json};

/// One approved homework, server time 1000
pub fn approved_hw1() -> Value {
    json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 1000
    })
}

/// Nothing changed, server time 1000
pub fn no_homeworks() -> Value {
    json!({"homeworks": [], "current_date": 1000})
}

/// A record with a status the bot does not know
pub fn unknown_status() -> Value {
    json!({
        "homeworks": [{"homework_name": "hw1", "status": "unknown_status"}],
        "current_date": 1000
    })
}
