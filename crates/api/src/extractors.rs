// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request body extraction
//!
//! [`JsonExtractor`] replaces `axum::Json` so that every body failure is
//! reported through [`ServerError`]:
//!
//! - a body that is not JSON at all becomes `ServerError::JsonError`
//! - JSON of the wrong shape becomes `ServerError::InvalidInput`, worded by
//!   the body type through [`JsonBody::invalid_input_message`]

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 256 * 1024;

/// A JSON request body
pub trait JsonBody: DeserializeOwned {
    /// Message for JSON that parsed but did not match the expected shape
    fn invalid_input_message(err: &serde_json::Error) -> String {
        format!("invalid request body: {err}")
    }
}

/// JSON extractor that reports failures as [`ServerError`]
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: JsonBody,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        check_content_type(req.headers())?;

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| malformed(format!("failed to read request body: {rejection}")))?;

        parse_body(&bytes).map(JsonExtractor)
    }
}

/// Reject bodies explicitly declared as something other than JSON
fn check_content_type(headers: &HeaderMap) -> Result<(), ServerError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };

    let declared = value.to_str().unwrap_or_default();
    let mime = declared.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(malformed(format!(
            "unsupported content-type '{declared}', expected 'application/json'"
        )))
    }
}

fn parse_body<T: JsonBody>(bytes: &[u8]) -> Result<T, ServerError> {
    if bytes.len() > MAX_BODY_BYTES {
        return Err(malformed(format!(
            "request body is {} bytes, limit is {MAX_BODY_BYTES}",
            bytes.len()
        )));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(malformed("request body is empty"));
    }

    serde_json::from_slice::<T>(bytes).map_err(|err| {
        if err.is_data() {
            ServerError::InvalidInput {
                message: T::invalid_input_message(&err),
            }
        } else if err.is_eof() {
            malformed("request body ends before the JSON value is complete")
        } else {
            malformed(format!(
                "malformed JSON at line {}, column {}",
                err.line(),
                err.column()
            ))
        }
    })
}

fn malformed(message: impl Into<String>) -> ServerError {
    ServerError::JsonError {
        message: message.into(),
    }
}
