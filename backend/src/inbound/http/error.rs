//! Rendering of domain errors as HTTP responses.
//!
//! Every error is logged once here, with its trace id, before the body is
//! built: internal failures at `error`, storage outages at `warn`, and
//! client mistakes at `debug`. Internal messages are then replaced with a
//! generic one, so driver and query text only ever reaches the log.
//! Validation and conflict details (`{"field", "code"}`) pass through
//! unchanged, and 401 responses carry a bearer challenge.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::{HttpResponse, ResponseError};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";
const BEARER_CHALLENGE: &str = "Bearer realm=\"social\"";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_error(err: &Error) {
    let trace_id = err.trace_id().unwrap_or("-");
    match err.code() {
        ErrorCode::InternalError => {
            error!(trace_id, message = err.message(), "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(trace_id, message = err.message(), "storage unavailable");
        }
        code => {
            debug!(trace_id, ?code, message = err.message(), "request rejected");
        }
    }
}

/// The body clients see: internal errors keep only their code and trace id.
fn client_view(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match err.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_error(self);

        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::Unauthorized {
            response.insert_header((WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_CHALLENGE)));
        }
        response.json(client_view(self))
    }
}
