use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;
use serde_json::json;

use crate::errors::{ResultResp, ServerError};

/// Serialize a value as a JSON response with the given status.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|_| ServerError::InternalError)?;
    json_body(status, body)
}

fn json_body(status: u16, body: String) -> ResultResp {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

/// Convert a ServerError into a JSON error response.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, message) = match &err {
        ServerError::NotFound => (404, "Not Found".to_string()),
        ServerError::BadRequest(msg) => (400, msg.clone()),
        ServerError::Unauthorized => (401, "Unauthorized".to_string()),
        ServerError::DbError(msg) => (500, msg.clone()),
        ServerError::InternalError => (500, "Internal Server Error".to_string()),
    };

    let body = json!({ "message": message }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
