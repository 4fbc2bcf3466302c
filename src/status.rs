//! Homework record formatting
//!
//! Turns one raw homework record into the sentence sent to the chat.

use crate::error::{Error, Result, ShapeError, json_type_name};
use crate::types::HomeworkStatus;
use serde_json::Value;
use tracing::error;

const CONTEXT: &str = "homework record";
const REQUIRED_KEYS: [&str; 2] = ["homework_name", "status"];

/// Build the notification text for one homework record
///
/// # Errors
/// - [`ShapeError::NotAnObject`] if the record is not a JSON object
/// - [`ShapeError::MissingKey`] if `homework_name` or `status` is absent
///   (an empty object fails here too)
/// - [`ShapeError::WrongType`] if either of them is not a string
/// - [`Error::UnknownStatus`] if the status is not one of the known values
pub fn parse_status(homework: &Value) -> Result<String> {
    let record = homework.as_object().ok_or(ShapeError::NotAnObject {
        context: CONTEXT,
        found: json_type_name(homework),
    })?;

    // Presence is checked for both keys before looking at either value.
    if let Some(key) = REQUIRED_KEYS.into_iter().find(|key| !record.contains_key(*key)) {
        error!(key, "homework record is missing a required key");
        return Err(ShapeError::MissingKey {
            context: CONTEXT,
            key,
        }
        .into());
    }

    let homework_name = string_field(homework, "homework_name")?;
    let raw_status = string_field(homework, "status")?;

    let status: HomeworkStatus = raw_status.parse().map_err(|_| {
        error!(homework_name, status = raw_status, "undocumented homework status");
        Error::UnknownStatus {
            homework_name: homework_name.to_string(),
            status: raw_status.to_string(),
        }
    })?;

    Ok(format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    ))
}

fn string_field<'a>(homework: &'a Value, key: &'static str) -> Result<&'a str> {
    let value = &homework[key];
    value.as_str().ok_or_else(|| {
        ShapeError::WrongType {
            context: CONTEXT,
            key,
            expected: "a string",
            found: json_type_name(value),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_statuses_produce_name_and_exact_verdict() {
        for status in HomeworkStatus::ALL {
            let record = json!({"homework_name": "hw1", "status": status.as_str()});

            let message = parse_status(&record).unwrap();

            assert!(message.contains("\"hw1\""), "got: {message}");
            assert!(message.ends_with(status.verdict()), "got: {message}");
        }
    }

    #[test]
    fn approved_message_text() {
        let record = json!({"homework_name": "hw1", "status": "approved", "id": 7});

        assert_eq!(
            parse_status(&record).unwrap(),
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn unknown_status_is_a_dedicated_error() {
        let record = json!({"homework_name": "hw1", "status": "unknown_status"});

        assert_eq!(
            parse_status(&record),
            Err(Error::UnknownStatus {
                homework_name: "hw1".to_string(),
                status: "unknown_status".to_string(),
            })
        );
    }

    #[test]
    fn missing_keys_fail_before_status_lookup() {
        // The status here is bogus too; the missing name must win.
        let no_name = json!({"status": "bogus"});
        assert_eq!(
            parse_status(&no_name),
            Err(Error::Shape(ShapeError::MissingKey {
                context: CONTEXT,
                key: "homework_name",
            }))
        );

        let no_status = json!({"homework_name": "hw1"});
        assert_eq!(
            parse_status(&no_status),
            Err(Error::Shape(ShapeError::MissingKey {
                context: CONTEXT,
                key: "status",
            }))
        );
    }

    #[test]
    fn empty_record_is_a_missing_key_failure() {
        let err = parse_status(&json!({})).unwrap_err();
        assert_eq!(err.error_code(), "missing_key");
    }

    #[test]
    fn non_object_record_is_a_type_failure() {
        assert_eq!(
            parse_status(&json!(["hw1", "approved"])),
            Err(Error::Shape(ShapeError::NotAnObject {
                context: CONTEXT,
                found: "an array",
            }))
        );
    }

    #[test]
    fn non_string_fields_are_type_failures() {
        let err = parse_status(&json!({"homework_name": 12, "status": "approved"})).unwrap_err();
        assert_eq!(
            err,
            Error::Shape(ShapeError::WrongType {
                context: CONTEXT,
                key: "homework_name",
                expected: "a string",
                found: "a number",
            })
        );

        let err = parse_status(&json!({"homework_name": "hw1", "status": null})).unwrap_err();
        assert_eq!(err.error_code(), "wrong_type");
    }
}
