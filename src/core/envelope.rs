//! Purpose: Interpret the `{status, results, error_message?}` geocoding envelope.
//! Exports: `interpret`, `STATUS_OK`, `STATUS_ZERO_RESULTS`.
//! Role: Envelope Interpreter; maps the service status onto results or an `Api` error.
//! Invariants: `OK` results pass through structurally unmodified.
//! Invariants: `ZERO_RESULTS` is an empty outcome, never an error.
//! Invariants: Any readable non-success status is `Api`, whatever shape the other fields have.
//! Invariants: Bodies that are not a JSON object with a string `status` fail with `Decode`.
use serde::Deserialize;
use serde_json::Value;

use super::error::{Error, ErrorKind};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

// `results` and `error_message` stay loose so an error status survives odd payloads.
#[derive(Deserialize)]
struct Envelope {
    status: Option<String>,
    #[serde(default)]
    results: Value,
    #[serde(default)]
    error_message: Value,
}

pub fn interpret(body: &str) -> Result<Vec<Value>, Error> {
    let value: Value = serde_json::from_str(body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid geocoding response json")
            .with_source(err)
    })?;
    if !value.is_object() {
        return Err(Error::new(ErrorKind::Decode)
            .with_message("geocoding response is not a json object"));
    }
    let envelope: Envelope = serde_json::from_value(value).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("geocoding response status is not a string")
            .with_source(err)
    })?;
    let error_message = envelope.error_message.as_str().map(str::to_string);

    match envelope.status.as_deref() {
        Some(STATUS_OK) => match envelope.results {
            Value::Array(results) => Ok(results),
            Value::Null => Ok(Vec::new()),
            _ => Err(Error::new(ErrorKind::Decode)
                .with_message("geocoding response results is not an array")),
        },
        Some(STATUS_ZERO_RESULTS) => Ok(Vec::new()),
        Some(status) => {
            let mut err = Error::new(ErrorKind::Api).with_api_status(status);
            err = match error_message {
                Some(message) => err.with_message(message),
                None => err.with_message(format!("geocoding service returned {status}")),
            };
            if let Some(hint) = status_hint(status) {
                err = err.with_hint(hint);
            }
            Err(err)
        }
        None => {
            let message =
                error_message.unwrap_or_else(|| "geocoding response has no status".to_string());
            Err(Error::new(ErrorKind::Api).with_message(message))
        }
    }
}

fn status_hint(status: &str) -> Option<&'static str> {
    match status {
        "OVER_QUERY_LIMIT" => Some("Quota exceeded; retry later or raise the project quota."),
        "REQUEST_DENIED" => Some("Check that the API key is valid and the Geocoding API is enabled."),
        "INVALID_REQUEST" => Some("Supply an address, components, or latlng."),
        "UNKNOWN_ERROR" => Some("Server-side failure; the request may succeed if retried."),
        _ => None,
    }
}
