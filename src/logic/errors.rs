use anyhow::Error;

use crate::api::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    ConnectionRefused,
    Timeout,
    Unauthorized, // HTTP 401/403
    NotFound,     // HTTP 404
    ServerError,  // HTTP 500+
    NetworkError, // DNS, routing, etc.
    Decode,       // Response did not match the expected OData shape
    Other,
}

fn classify_status(status: u16) -> ErrorType {
    match status {
        401 | 403 => ErrorType::Unauthorized,
        404 => ErrorType::NotFound,
        500..=599 => ErrorType::ServerError,
        _ => ErrorType::Other,
    }
}

/// Classify an error based on its type and error chain
pub fn classify_error(error: &Error) -> ErrorType {
    for cause in error.chain() {
        if let Some(request_err) = cause.downcast_ref::<RequestError>() {
            if let RequestError::Decode { .. } = request_err {
                return ErrorType::Decode;
            }
            if let Some(status) = request_err.status() {
                return classify_status(status.as_u16());
            }
        }
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if reqwest_err.is_timeout() {
                return ErrorType::Timeout;
            }
            if let Some(status) = reqwest_err.status() {
                return classify_status(status.as_u16());
            }
        }
    }

    let error_msg = format!("{:#}", error).to_lowercase();

    if error_msg.contains("connection refused") {
        return ErrorType::ConnectionRefused;
    }
    if error_msg.contains("timeout") || error_msg.contains("timed out") {
        return ErrorType::Timeout;
    }
    if error_msg.contains("dns") || error_msg.contains("network") {
        return ErrorType::NetworkError;
    }

    ErrorType::Other
}

/// Format error message for the terminal - show the most specific cause
pub fn format_error_message(error: &Error) -> String {
    // A RequestError already names the URL and status, prefer it over its source
    for cause in error.chain() {
        if let Some(request_err) = cause.downcast_ref::<RequestError>() {
            return request_err.to_string();
        }
    }

    // Otherwise report the root cause
    error.root_cause().to_string()
}
