use std::fmt;

/// The subset of HTTP status codes a node or the network may answer with.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum StatusCode {
    Ok,
    BadRequest,
    InternalServerError,
    /// No node is registered at the target address.
    ServiceUnavailable,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        };
        write!(f, "{} {}", self.as_u16(), reason)
    }
}
