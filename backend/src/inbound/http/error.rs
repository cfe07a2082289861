//! Response mapping for domain errors.
//!
//! Each [`ErrorCode`] belongs to one family of the portal's error taxonomy.
//! The family fixes the HTTP status and how loudly the failure is logged.
//! Persistence failures (`internal_error` and `service_unavailable`) never
//! leak their message: clients see a fixed text and the trace id needed to
//! find the log line.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias returned by every handler.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Validation,
    Access,
    NotFound,
    StateTransition,
    Conflict,
    Persistence,
}

impl Family {
    const fn of(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest => Self::Validation,
            ErrorCode::Unauthorized | ErrorCode::Forbidden => Self::Access,
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::InvalidTransition => Self::StateTransition,
            ErrorCode::Conflict => Self::Conflict,
            ErrorCode::ServiceUnavailable | ErrorCode::InternalError => Self::Persistence,
        }
    }
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidTransition => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_rejection(err: &Error) {
    let code = err.code();
    match Family::of(code) {
        Family::Persistence => {
            error!(?code, message = err.message(), trace_id = err.trace_id(), "request failed");
        }
        Family::StateTransition | Family::Conflict => {
            warn!(?code, message = err.message(), trace_id = err.trace_id(), "request rejected");
        }
        Family::Validation | Family::Access | Family::NotFound => {
            debug!(?code, trace_id = err.trace_id(), "request rejected");
        }
    }
}

/// Body sent to the client: persistence failures keep only code and trace id.
fn client_body(err: &Error) -> Error {
    let body = match err.code() {
        ErrorCode::InternalError => Error::internal(REDACTED_MESSAGE),
        ErrorCode::ServiceUnavailable => Error::service_unavailable(UNAVAILABLE_MESSAGE),
        _ => return err.clone(),
    };
    match err.trace_id() {
        Some(id) => body.with_trace_id(id.to_owned()),
        None => body,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_rejection(self);
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_body(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced in a handler");
        Self::internal(REDACTED_MESSAGE)
    }
}
