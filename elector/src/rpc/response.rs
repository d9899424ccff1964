use std::fmt;

use serde::de::DeserializeOwned;

use crate::rpc::StatusCode;

/// The answer to a [`Request`](crate::rpc::Request).
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Response {
    pub ok: bool,
    pub status: StatusCode,

    /// JSON encoded payload.
    pub body: Option<String>,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ok:{}, status:{}", self.ok, self.status)?;
        if let Some(body) = &self.body {
            write!(f, ", body:{}", body)?;
        }
        write!(f, "}}")
    }
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            status: StatusCode::Ok,
            body: None,
        }
    }

    pub fn ok_with(body: impl ToString) -> Self {
        Self {
            body: Some(body.to_string()),
            ..Self::ok()
        }
    }

    pub fn bad_request() -> Self {
        Self::failed(StatusCode::BadRequest)
    }

    pub fn internal_error() -> Self {
        Self::failed(StatusCode::InternalServerError)
    }

    pub fn unavailable() -> Self {
        Self::failed(StatusCode::ServiceUnavailable)
    }

    fn failed(status: StatusCode) -> Self {
        Self {
            ok: false,
            status,
            body: None,
        }
    }

    /// Decode the JSON body.
    ///
    /// Returns `None` if the response failed, has no body or the body is
    /// malformed. Callers treat all of these as "no answer".
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.ok {
            return None;
        }
        let body = self.body.as_ref()?;
        serde_json::from_str(body).ok()
    }
}
