use std::fmt;

use crate::rpc::Method;
use crate::NodeId;

/// A request addressed to a node through the network.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Request {
    /// Address of the node that should receive this request.
    pub target: NodeId,

    /// Handler path on the target, e.g. `/vote`.
    pub path: String,

    pub method: Method,

    /// JSON encoded payload.
    pub body: Option<String>,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url())?;
        if let Some(body) = &self.body {
            write!(f, " {}", body)?;
        }
        Ok(())
    }
}

impl Request {
    pub fn new(
        target: impl ToString,
        path: impl ToString,
        method: Method,
    ) -> Self {
        Self {
            target: target.to_string(),
            path: path.to_string(),
            method,
            body: None,
        }
    }

    pub fn get(target: impl ToString, path: impl ToString) -> Self {
        Self::new(target, path, Method::Get)
    }

    pub fn post(target: impl ToString, path: impl ToString) -> Self {
        Self::new(target, path, Method::Post)
    }

    pub fn with_body(mut self, body: impl ToString) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Serialize `payload` as the JSON body of this request.
    pub fn with_json<T: serde::Serialize>(
        self,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(payload)?;
        Ok(self.with_body(body))
    }

    /// The full url, target address followed by the path: `node-0/vote`.
    pub fn url(&self) -> String {
        format!("{}{}", self.target, self.path)
    }
}
