//! Domain errors as HTTP responses.
//!
//! Every error becomes a JSON body with a status derived from its code, a
//! `Cache-Control: no-store` header and, when known, the `trace-id` header.
//! Validation failures keep `details.fields` so a form can mark each field;
//! internal failures are logged and replaced by a generic payload.

use actix_web::http::StatusCode;
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, ResponseError};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
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

/// The error as the client may see it.
fn client_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let generic = Error::internal(INTERNAL_MESSAGE);
    match error.trace_id() {
        Some(id) => generic.with_trace_id(id.to_owned()),
        None => generic,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let trace_id = self.trace_id().unwrap_or("-");
        if status.is_server_error() {
            error!(code = ?self.code(), trace_id, message = self.message(), "request failed");
        } else {
            debug!(code = ?self.code(), trace_id, "request rejected");
        }

        let mut response = HttpResponse::build(status);
        response.insert_header(CacheControl(vec![CacheDirective::NoStore]));
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_view(self))
    }
}
