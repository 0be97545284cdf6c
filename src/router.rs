//! Dispatch by endpoint (first path segment) and method.

use std::path::PathBuf;

use crate::handlers::{self, WriteLocks};
use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Routes requests to handlers.
///
/// Holds the serving directory for the `files` endpoint and the write lock
/// table shared by every connection.
#[derive(Debug, Clone)]
pub struct Router {
    directory: PathBuf,
    write_locks: WriteLocks,
}

impl Router {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            write_locks: WriteLocks::new(),
        }
    }

    /// Selects a handler by exact match on the endpoint and method.
    ///
    /// | endpoint     | method | handler              |
    /// |--------------|--------|----------------------|
    /// | (empty)      | GET    | empty `text/plain`   |
    /// | `echo`       | GET    | [`handlers::echo`]   |
    /// | `user-agent` | GET    | [`handlers::user_agent`] |
    /// | `files`      | GET    | [`handlers::read_file`]  |
    /// | `files`      | POST   | [`handlers::write_file`] |
    ///
    /// Everything else, including a known endpoint with the wrong method,
    /// is 404. Within `files`, a bare `/files` path names nothing: GET
    /// answers 404 and POST answers 400.
    pub async fn route(&self, request: &Request) -> Response {
        let Some(endpoint) = request.endpoint() else {
            return Response::not_found();
        };

        match (endpoint, &request.method) {
            ("", Method::GET) => Response::text(""),
            ("echo", Method::GET) => handlers::echo(request),
            ("user-agent", Method::GET) => handlers::user_agent(request),
            ("files", Method::GET) => handlers::read_file(request, &self.directory).await,
            ("files", Method::POST) => {
                handlers::write_file(request, &self.directory, &self.write_locks).await
            }
            _ => Response::not_found(),
        }
    }
}
